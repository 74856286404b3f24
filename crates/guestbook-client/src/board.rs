use serde_json::Value;
use tracing::{error, info};

use guestbook_types::models::DEFAULT_NAME;
use guestbook_types::{Document, Message};

use crate::error::ClientError;
use crate::transport::Transport;

/// Local time format stamped on new entries.
pub const CLIENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub const LOAD_FAILED_TEXT: &str = "Could not load guestbook entries.";
pub const EMPTY_TEXT: &str = "No entries yet. Be the first to sign!";

/// One reversible change to the chronological message list.
///
/// Applying an edit yields its inverse, which is what a failed save applies
/// to put the list back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert { index: usize, message: Message },
    Remove { index: usize },
}

impl Edit {
    pub fn apply(self, messages: &mut Vec<Message>) -> Result<Edit, ClientError> {
        match self {
            Edit::Insert { index, message } => {
                if index > messages.len() {
                    return Err(ClientError::NoSuchEntry(index));
                }
                messages.insert(index, message);
                Ok(Edit::Remove { index })
            }
            Edit::Remove { index } => {
                if index >= messages.len() {
                    return Err(ClientError::NoSuchEntry(index));
                }
                let message = messages.remove(index);
                Ok(Edit::Insert { index, message })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Loading,
    Loaded,
    Failed,
}

/// What the guestbook panel should show.
#[derive(Debug, PartialEq, Eq)]
pub enum BoardView<'a> {
    Loading,
    Failed,
    Empty,
    /// Newest first, each paired with its chronological index (the index
    /// deletions must use).
    Entries(Vec<(usize, &'a Message)>),
}

impl BoardView<'_> {
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            BoardView::Failed => Some(LOAD_FAILED_TEXT),
            BoardView::Empty => Some(EMPTY_TEXT),
            BoardView::Loading | BoardView::Entries(_) => None,
        }
    }
}

/// Message-list guestbook controller.
///
/// Local state is the source of truth once an edit is applied; the whole list
/// is pushed after every edit and the edit is undone only if that push fails.
pub struct MessageBoard<T> {
    transport: T,
    messages: Vec<Message>,
    state: LoadState,
}

impl<T: Transport> MessageBoard<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            messages: Vec::new(),
            state: LoadState::Loading,
        }
    }

    /// Chronological list, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Replace local messages with the stored ones. On failure the board is
    /// left empty and shows the error placeholder.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        match self.transport.fetch().await.and_then(parse_messages) {
            Ok(messages) => {
                info!("Loaded {} guestbook entries", messages.len());
                self.messages = messages;
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                error!("Error loading guestbook: {}", e);
                self.messages.clear();
                self.state = LoadState::Failed;
                Err(e)
            }
        }
    }

    /// Sign the guestbook. Blank text is refused before anything is sent.
    pub async fn add_entry(&mut self, name: &str, text: &str) -> Result<(), ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::EmptyText);
        }
        let name = match name.trim() {
            "" => DEFAULT_NAME,
            name => name,
        };

        let message = Message {
            name: name.to_string(),
            text: text.to_string(),
            date: chrono::Local::now().format(CLIENT_DATE_FORMAT).to_string(),
        };
        let index = self.messages.len();
        self.commit(Edit::Insert { index, message }).await
    }

    /// Delete the entry at chronological `index` once `confirm` agrees.
    /// Returns `Ok(false)` when the visitor declined.
    pub async fn delete_entry<F>(&mut self, index: usize, confirm: F) -> Result<bool, ClientError>
    where
        F: FnOnce(&Message) -> bool,
    {
        let message = self.messages.get(index).ok_or(ClientError::NoSuchEntry(index))?;
        if !confirm(message) {
            return Ok(false);
        }
        self.commit(Edit::Remove { index }).await?;
        Ok(true)
    }

    /// Delete by position in the newest-first display.
    pub async fn delete_displayed<F>(&mut self, position: usize, confirm: F) -> Result<bool, ClientError>
    where
        F: FnOnce(&Message) -> bool,
    {
        let index = self
            .chronological_index(position)
            .ok_or(ClientError::NoSuchEntry(position))?;
        self.delete_entry(index, confirm).await
    }

    /// Map a newest-first display position to the chronological index.
    pub fn chronological_index(&self, position: usize) -> Option<usize> {
        (position < self.messages.len()).then(|| self.messages.len() - 1 - position)
    }

    pub fn entries_newest_first(&self) -> impl Iterator<Item = (usize, &Message)> {
        self.messages.iter().enumerate().rev()
    }

    pub fn view(&self) -> BoardView<'_> {
        match self.state {
            LoadState::Loading => BoardView::Loading,
            LoadState::Failed => BoardView::Failed,
            LoadState::Loaded if self.messages.is_empty() => BoardView::Empty,
            LoadState::Loaded => BoardView::Entries(self.entries_newest_first().collect()),
        }
    }

    /// Apply locally, push the whole list, undo on failure.
    async fn commit(&mut self, edit: Edit) -> Result<(), ClientError> {
        let undo = edit.apply(&mut self.messages)?;

        let document = Document::Messages {
            messages: self.messages.clone(),
        };
        if let Err(e) = self.transport.save(&document).await {
            error!("Error saving guestbook: {}", e);
            if let Err(undo_err) = undo.apply(&mut self.messages) {
                error!("Could not roll back guestbook edit: {}", undo_err);
            }
            return Err(e);
        }

        // A successful save also means the board now reflects stored state.
        self.state = LoadState::Loaded;
        Ok(())
    }
}

fn parse_messages(document: Value) -> Result<Vec<Message>, ClientError> {
    match document.get("messages") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(messages) => serde_json::from_value(messages.clone())
            .map_err(|e| ClientError::Malformed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTransport;
    use serde_json::json;

    fn msg(name: &str, text: &str) -> Message {
        Message {
            name: name.into(),
            text: text.into(),
            date: "2024-01-01".into(),
        }
    }

    fn stored_texts(transport: &MemoryTransport) -> Vec<String> {
        transport.stored()["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap().to_string())
            .collect()
    }

    async fn loaded_board(texts: &[&str]) -> (MemoryTransport, MessageBoard<MemoryTransport>) {
        let messages: Vec<Message> = texts.iter().map(|t| msg("n", t)).collect();
        let transport = MemoryTransport::with_document(json!({ "messages": messages }));
        let mut board = MessageBoard::new(transport.clone());
        board.load().await.unwrap();
        (transport, board)
    }

    #[test]
    fn edits_invert() {
        let mut list = vec![msg("a", "1"), msg("b", "2")];
        let undo = Edit::Remove { index: 0 }.apply(&mut list).unwrap();
        assert_eq!(list, vec![msg("b", "2")]);
        let redo = undo.apply(&mut list).unwrap();
        assert_eq!(list, vec![msg("a", "1"), msg("b", "2")]);
        assert_eq!(redo, Edit::Remove { index: 0 });

        assert!(matches!(
            Edit::Remove { index: 5 }.apply(&mut list),
            Err(ClientError::NoSuchEntry(5))
        ));
        assert!(matches!(
            Edit::Insert { index: 3, message: msg("c", "3") }.apply(&mut list),
            Err(ClientError::NoSuchEntry(3))
        ));
    }

    #[tokio::test]
    async fn load_replaces_local_messages() {
        let (_transport, board) = loaded_board(&["first", "second"]).await;
        assert_eq!(board.messages().len(), 2);
        assert_eq!(board.messages()[0].text, "first");
    }

    #[tokio::test]
    async fn load_without_messages_key_is_empty() {
        let transport = MemoryTransport::with_document(json!({}));
        let mut board = MessageBoard::new(transport);
        assert_eq!(board.view(), BoardView::Loading);
        board.load().await.unwrap();
        assert_eq!(board.view(), BoardView::Empty);
        assert_eq!(board.view().placeholder(), Some(EMPTY_TEXT));
    }

    #[tokio::test]
    async fn load_failure_shows_placeholder() {
        let transport = MemoryTransport::messages();
        transport.fail_fetches(true);
        let mut board = MessageBoard::new(transport);
        assert!(board.load().await.is_err());
        assert!(board.messages().is_empty());
        assert_eq!(board.view(), BoardView::Failed);
        assert_eq!(board.view().placeholder(), Some(LOAD_FAILED_TEXT));
    }

    #[tokio::test]
    async fn malformed_messages_fail_the_load() {
        let transport = MemoryTransport::with_document(json!({ "messages": "nope" }));
        let mut board = MessageBoard::new(transport);
        assert!(matches!(board.load().await, Err(ClientError::Malformed(_))));
        assert_eq!(board.view(), BoardView::Failed);
    }

    #[tokio::test]
    async fn blank_text_is_refused_without_network() {
        let (transport, mut board) = loaded_board(&[]).await;
        let err = board.add_entry("Al", "   \n").await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyText));
        assert_eq!(err.alert_text(), "Please write a message first!");
        assert_eq!(transport.attempts(), 0);
        assert!(board.messages().is_empty());
    }

    #[tokio::test]
    async fn add_entry_saves_full_list() {
        let (transport, mut board) = loaded_board(&["old"]).await;
        board.add_entry("  ", " hello ").await.unwrap();

        assert_eq!(board.messages().len(), 2);
        let added = &board.messages()[1];
        assert_eq!(added.name, "Anonymous");
        assert_eq!(added.text, "hello");
        assert!(!added.date.is_empty());

        assert_eq!(transport.attempts(), 1);
        assert_eq!(stored_texts(&transport), vec!["old", "hello"]);
    }

    #[tokio::test]
    async fn failed_add_is_rolled_back() {
        let (transport, mut board) = loaded_board(&["old"]).await;
        transport.fail_saves(true);

        let err = board.add_entry("Al", "hi").await.unwrap_err();
        assert_eq!(err.alert_text(), "Could not save the guestbook. Please try again.");
        assert_eq!(board.messages(), &[msg("n", "old")]);
        assert_eq!(stored_texts(&transport), vec!["old"]);
    }

    #[tokio::test]
    async fn deleting_newest_displayed_removes_last_chronological() {
        let (transport, mut board) = loaded_board(&["oldest", "middle", "newest"]).await;

        let shown: Vec<&str> = board.entries_newest_first().map(|(_, m)| m.text.as_str()).collect();
        assert_eq!(shown, vec!["newest", "middle", "oldest"]);
        assert_eq!(board.chronological_index(0), Some(2));
        assert_eq!(board.chronological_index(3), None);

        assert!(board.delete_displayed(0, |_| true).await.unwrap());
        assert_eq!(stored_texts(&transport), vec!["oldest", "middle"]);
    }

    #[tokio::test]
    async fn declined_delete_changes_nothing() {
        let (transport, mut board) = loaded_board(&["a", "b"]).await;
        let mut asked_about = None;
        let deleted = board
            .delete_entry(0, |m| {
                asked_about = Some(m.text.clone());
                false
            })
            .await
            .unwrap();
        assert!(!deleted);
        assert_eq!(asked_about.as_deref(), Some("a"));
        assert_eq!(board.messages().len(), 2);
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn failed_delete_reinserts_at_same_index() {
        let (transport, mut board) = loaded_board(&["a", "b", "c"]).await;
        transport.fail_saves(true);

        assert!(board.delete_entry(1, |_| true).await.is_err());
        let texts: Vec<&str> = board.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn delete_out_of_range_is_an_error() {
        let (transport, mut board) = loaded_board(&["a"]).await;
        assert!(matches!(
            board.delete_displayed(4, |_| true).await,
            Err(ClientError::NoSuchEntry(4))
        ));
        assert!(matches!(
            board.delete_entry(1, |_| true).await,
            Err(ClientError::NoSuchEntry(1))
        ));
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn view_lists_newest_first_with_chronological_indices() {
        let (_transport, board) = loaded_board(&["x", "y"]).await;
        let BoardView::Entries(entries) = board.view() else {
            panic!("expected entries");
        };
        let pairs: Vec<(usize, &str)> = entries.iter().map(|(i, m)| (*i, m.text.as_str())).collect();
        assert_eq!(pairs, vec![(1, "y"), (0, "x")]);
    }

    #[tokio::test]
    async fn last_full_save_wins_between_visitors() {
        let transport = MemoryTransport::messages();
        let mut alice = MessageBoard::new(transport.clone());
        let mut bob = MessageBoard::new(transport.clone());
        alice.load().await.unwrap();
        bob.load().await.unwrap();

        alice.add_entry("alice", "from alice").await.unwrap();
        bob.add_entry("bob", "from bob").await.unwrap();

        assert_eq!(stored_texts(&transport), vec!["from bob"]);
        assert_eq!(alice.messages().len(), 1);
        assert_eq!(alice.messages()[0].text, "from alice");
    }
}
