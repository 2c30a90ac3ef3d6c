//! Conversation state for multi-turn question answering.
//!
//! A session owns exactly one [`ChatHistory`]; the pipeline borrows it
//! per question and never mutates it. Turns are append-only within a
//! session; the caller records the human question and the assistant
//! answer after each successful exchange.

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Human,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Human => "Human",
            Role::Assistant => "Assistant",
        }
    }
}

/// One conversation turn: who spoke, and what they said.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Ordered, append-only sequence of conversation turns.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    turns: Vec<Turn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    pub fn push_human(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Human,
            text: text.into(),
        });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            text: text.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_keep_insertion_order() {
        let mut history = ChatHistory::new();
        history.push_human("What is ReAct?");
        history.push_assistant("A prompting pattern.");
        history.push_human("What does it combine?");

        assert_eq!(history.len(), 3);
        assert_eq!(history.turns()[0].role, Role::Human);
        assert_eq!(history.turns()[1].role, Role::Assistant);
        assert_eq!(history.turns()[2].text, "What does it combine?");
    }

    #[test]
    fn test_empty_history() {
        let history = ChatHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }
}
