use sql_chat::conversation::{Conversation, Role};

pub trait RenderAssertions {
    fn assert_contains(&self, text: &str);
    fn assert_not_contains(&self, text: &str);
    fn assert_line_contains(&self, line: usize, text: &str);
    fn assert_popup_visible(&self, title: &str);
}

impl RenderAssertions for Vec<String> {
    fn assert_contains(&self, text: &str) {
        let full_content = self.join("\n");
        assert!(full_content.contains(text), "Expected to find '{}' in rendered output:\n{}", text, full_content);
    }

    fn assert_not_contains(&self, text: &str) {
        let full_content = self.join("\n");
        assert!(!full_content.contains(text), "Expected NOT to find '{}' in rendered output:\n{}", text, full_content);
    }

    fn assert_line_contains(&self, line: usize, text: &str) {
        assert!(line < self.len(), "Line {} is out of bounds (total lines: {})", line, self.len());

        assert!(self[line].contains(text), "Expected line {} to contain '{}', but got: '{}'", line, text, self[line]);
    }

    fn assert_popup_visible(&self, title: &str) {
        let has_border = self.iter().any(|line| line.contains('╭') || line.contains('┌'));
        assert!(has_border, "Expected a bordered popup in rendered output");
        self.assert_contains(title);
    }
}

pub trait ConversationAssertions {
    fn assert_alternates(&self);
    fn assert_last_from(&self, role: Role, content: &str);
}

impl ConversationAssertions for Conversation {
    /// Greeting first, then user/assistant pairs.
    fn assert_alternates(&self) {
        let roles: Vec<Role> = self.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles.first(), Some(&Role::Assistant), "transcript must open with the greeting");
        for (i, pair) in roles[1..].chunks(2).enumerate() {
            assert_eq!(pair[0], Role::User, "entry {} should be from the user: {:?}", 1 + 2 * i, roles);
            if let Some(reply) = pair.get(1) {
                assert_eq!(*reply, Role::Assistant, "entry {} should be from the assistant: {:?}", 2 + 2 * i, roles);
            }
        }
    }

    fn assert_last_from(&self, role: Role, content: &str) {
        let last = self.last().expect("conversation is never empty");
        assert_eq!(last.role, role);
        assert_eq!(last.content, content);
    }
}
