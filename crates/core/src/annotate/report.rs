//! Result of an annotate request.

use crate::history::RevisionId;

/// One line of the annotated file and the revision that introduced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedLine {
    pub text: Vec<u8>,
    /// `None` only in an incomplete report.
    pub revision: Option<RevisionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateReport {
    pub lines: Vec<AnnotatedLine>,
    /// Every revision credited with at least one line, in order of first
    /// appearance from the top of the file.
    pub revisions: Vec<RevisionId>,
    /// False when the traversal ran out of revisions before every line was
    /// attributed.
    pub complete: bool,
}

impl AnnotateReport {
    pub(crate) fn new(lines: Vec<AnnotatedLine>, complete: bool) -> Self {
        let mut revisions: Vec<RevisionId> = Vec::new();
        for revision in lines.iter().filter_map(|l| l.revision.as_ref()) {
            if !revisions.contains(revision) {
                revisions.push(revision.clone());
            }
        }
        Self {
            lines,
            revisions,
            complete,
        }
    }

    pub fn unattributed(&self) -> usize {
        self.lines.iter().filter(|l| l.revision.is_none()).count()
    }

    /// Render as `<revision prefix>: <line>` rows. Unattributed lines get a
    /// `?` in the revision column.
    pub fn render(&self, width: usize) -> String {
        self.lines
            .iter()
            .map(|line| {
                let prefix = line
                    .revision
                    .as_ref()
                    .map(|r| r.short(width))
                    .unwrap_or("?");
                format!(
                    "{:<width$}: {}\n",
                    prefix,
                    String::from_utf8_lossy(&line.text),
                    width = width
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, revision: Option<&str>) -> AnnotatedLine {
        AnnotatedLine {
            text: text.as_bytes().to_vec(),
            revision: revision.map(RevisionId::from),
        }
    }

    #[test]
    fn test_revisions_in_order_of_first_appearance() {
        let report = AnnotateReport::new(
            vec![
                line("a", Some("r3")),
                line("b", Some("r1")),
                line("c", Some("r3")),
                line("d", Some("r2")),
            ],
            true,
        );
        let ids: Vec<&str> = report.revisions.iter().map(|r| r.as_str()).collect();
        assert_eq!(ids, vec!["r3", "r1", "r2"]);
    }

    #[test]
    fn test_render() {
        let report = AnnotateReport::new(
            vec![
                line("fn main() {}", Some("0123456789abcdef")),
                line("lost", None),
            ],
            false,
        );
        assert_eq!(report.unattributed(), 1);
        assert_eq!(report.render(8), "01234567: fn main() {}\n?       : lost\n");
    }
}
