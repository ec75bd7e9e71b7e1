use crate::domain::blocks::BlockKind;

/// Which list, if any, is open in the current block sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListState {
    #[default]
    None,
    Unordered,
    Ordered,
}

impl ListState {
    fn for_kind(kind: &BlockKind) -> Self {
        match kind {
            BlockKind::BulletedListItem => ListState::Unordered,
            BlockKind::NumberedListItem => ListState::Ordered,
            _ => ListState::None,
        }
    }

    fn open_marker(self) -> Option<&'static str> {
        match self {
            ListState::None => None,
            ListState::Unordered => Some("<ul>"),
            ListState::Ordered => Some("<ol>"),
        }
    }

    fn close_marker(self) -> Option<&'static str> {
        match self {
            ListState::None => None,
            ListState::Unordered => Some("</ul>"),
            ListState::Ordered => Some("</ol>"),
        }
    }
}

/// Groups consecutive list items of one kind under a single list element.
///
/// One value per block sequence: a child sequence starts from
/// [`ListState::None`] and never sees its parent's state.
#[derive(Debug, Default)]
pub struct ListGrouping {
    state: ListState,
}

impl ListGrouping {
    pub fn state(&self) -> ListState {
        self.state
    }

    /// Emit whatever markers must precede a block of `kind`.
    pub fn visit(&mut self, kind: &BlockKind, html: &mut Vec<String>) {
        let target = ListState::for_kind(kind);
        if target == self.state {
            return;
        }

        self.close(html);
        if let Some(open) = target.open_marker() {
            html.push(open.to_string());
        }
        self.state = target;
    }

    /// Close the open list at the end of a sequence.
    pub fn finish(&mut self, html: &mut Vec<String>) {
        self.close(html);
    }

    fn close(&mut self, html: &mut Vec<String>) {
        if let Some(close) = self.state.close_marker() {
            html.push(close.to_string());
        }
        self.state = ListState::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(kinds: &[BlockKind]) -> Vec<String> {
        let mut grouping = ListGrouping::default();
        let mut html = Vec::new();
        for kind in kinds {
            grouping.visit(kind, &mut html);
            html.push("item".to_string());
        }
        grouping.finish(&mut html);
        html
    }

    #[test]
    fn consecutive_items_share_one_list() {
        let html = drive(&[BlockKind::BulletedListItem, BlockKind::BulletedListItem]);
        assert_eq!(html, vec!["<ul>", "item", "item", "</ul>"]);
    }

    #[test]
    fn switching_list_kind_closes_previous_list() {
        let html = drive(&[BlockKind::BulletedListItem, BlockKind::NumberedListItem]);
        assert_eq!(html, vec!["<ul>", "item", "</ul>", "<ol>", "item", "</ol>"]);
    }

    #[test]
    fn non_list_block_closes_open_list() {
        let html = drive(&[
            BlockKind::NumberedListItem,
            BlockKind::Paragraph,
            BlockKind::NumberedListItem,
        ]);
        assert_eq!(
            html,
            vec!["<ol>", "item", "</ol>", "item", "<ol>", "item", "</ol>"]
        );
    }

    #[test]
    fn sequences_without_lists_emit_no_markers() {
        let html = drive(&[BlockKind::Paragraph, BlockKind::Divider]);
        assert_eq!(html, vec!["item", "item"]);
    }

    #[test]
    fn finish_resets_state() {
        let mut grouping = ListGrouping::default();
        let mut html = Vec::new();
        grouping.visit(&BlockKind::BulletedListItem, &mut html);
        assert_eq!(grouping.state(), ListState::Unordered);
        grouping.finish(&mut html);
        assert_eq!(grouping.state(), ListState::None);
        grouping.finish(&mut html);
        assert_eq!(html, vec!["<ul>", "</ul>"]);
    }
}
