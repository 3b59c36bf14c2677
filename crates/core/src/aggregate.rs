//! Page aggregation: body lines of each geometric block become one stanza.

use serde::{Deserialize, Serialize};

use crate::classify::{ClassifiedLine, ClassifiedPage, Role};

/// Ordered, non-empty lines of one verse or refrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StanzaBlock {
    pub lines: Vec<String>,
}

impl StanzaBlock {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// First line, trimmed. Empty for an empty block.
    pub fn head(&self) -> &str {
        self.lines.first().map(|l| l.trim()).unwrap_or_default()
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Collect the body lines of one block, or `None` when it holds none.
pub fn stanza_from_lines(lines: &[ClassifiedLine]) -> Option<StanzaBlock> {
    let body: Vec<String> = lines
        .iter()
        .filter(|line| line.role == Role::Body)
        .map(|line| line.text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if body.is_empty() {
        None
    } else {
        Some(StanzaBlock { lines: body })
    }
}

/// Turn a classified page into its stanza blocks, in block order.
pub fn aggregate(page: &ClassifiedPage) -> Vec<StanzaBlock> {
    page.blocks
        .iter()
        .filter_map(|block| stanza_from_lines(block))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cl(text: &str, role: Role) -> ClassifiedLine {
        ClassifiedLine {
            text: text.to_string(),
            size: 11.0,
            y: 100.0,
            role,
        }
    }

    fn page(blocks: Vec<Vec<ClassifiedLine>>) -> ClassifiedPage {
        ClassifiedPage {
            number: 1,
            number_label: None,
            title: None,
            blocks,
        }
    }

    #[test]
    fn test_aggregate_one_stanza_per_block() {
        let p = page(vec![
            vec![cl("Oh Dios eterno", Role::Body), cl("tu misericordia", Role::Body)],
            vec![cl("CORO", Role::Body), cl("Grande es tu fidelidad", Role::Body)],
        ]);
        let stanzas = aggregate(&p);
        assert_eq!(stanzas.len(), 2);
        assert_eq!(stanzas[0].lines, vec!["Oh Dios eterno", "tu misericordia"]);
        assert_eq!(stanzas[1].head(), "CORO");
    }

    #[test]
    fn test_aggregate_skips_blocks_without_body() {
        let p = page(vec![
            vec![cl("GRANDE ES TU FIDELIDAD", Role::Title)],
            vec![cl("42", Role::NumberLabel)],
            vec![cl("pie de página", Role::Ignored)],
            vec![cl("verso", Role::Body)],
        ]);
        let stanzas = aggregate(&p);
        assert_eq!(stanzas, vec![StanzaBlock::new(["verso"])]);
    }

    #[test]
    fn test_aggregate_drops_non_body_lines_inside_block() {
        let p = page(vec![vec![
            cl("TÍTULO", Role::Title),
            cl("primera", Role::Body),
            cl("12", Role::Ignored),
            cl("segunda", Role::Body),
        ]]);
        assert_eq!(aggregate(&p)[0].lines, vec!["primera", "segunda"]);
    }

    #[test]
    fn test_aggregate_empty_page() {
        assert!(aggregate(&page(vec![])).is_empty());
        assert!(aggregate(&page(vec![vec![]])).is_empty());
    }

    #[test]
    fn test_stanza_text_and_head() {
        let block = StanzaBlock::new(["  2 ", "Cuando"]);
        assert_eq!(block.head(), "2");
        assert_eq!(block.text(), "  2 \nCuando");
        assert_eq!(StanzaBlock::default().head(), "");
    }
}
