//! An in-memory document made of formatted runs.

use std::{borrow::Cow, fmt};

use super::{Document, Formatting, HostError, Selection};

/// A contiguous piece of text sharing one formatting.
#[derive(Debug, Clone, PartialEq)]
struct Run {
    text: String,
    formatting: Formatting,
}

type SelectionCallback = Box<dyn FnMut(Selection)>;

/// A document held in memory as a sequence of formatted runs.
///
/// Adjacent runs with equal formatting are merged after every mutation, so
/// the run list is always the minimal description of the document.
#[derive(Default)]
pub struct StyledDocument {
    runs: Vec<Run>,
    selection: Option<Selection>,
    observers: Vec<SelectionCallback>,
}

impl fmt::Debug for StyledDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyledDocument")
            .field("runs", &self.runs)
            .field("selection", &self.selection)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl StyledDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text` with the given formatting.
    #[must_use]
    pub fn with_run(mut self, text: impl Into<String>, formatting: Formatting) -> Self {
        self.runs.push(Run {
            text: text.into(),
            formatting,
        });
        self.normalize();
        self
    }

    /// Returns the document text.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Returns the runs as `(text, formatting)` pairs.
    pub fn runs(&self) -> impl Iterator<Item = (&str, &Formatting)> {
        self.runs
            .iter()
            .map(|run| (run.text.as_str(), &run.formatting))
    }

    /// Returns the current selection, if one has been made.
    #[must_use]
    pub const fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Registers a callback invoked whenever the selection changes.
    pub fn on_selection_changed(&mut self, callback: impl FnMut(Selection) + 'static) {
        self.observers.push(Box::new(callback));
    }

    /// Moves the selection and notifies observers.
    ///
    /// Observers are not notified if the selection is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is invalid.
    pub fn select(&mut self, selection: Selection) -> Result<(), HostError> {
        selection.validate(&self.text())?;
        if self.selection == Some(selection) {
            return Ok(());
        }
        self.selection = Some(selection);
        for observer in &mut self.observers {
            observer(selection);
        }
        Ok(())
    }

    /// Splits runs so that a run boundary falls on `offset`, returning the
    /// index of the run starting there.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for index in 0..self.runs.len() {
            let len = self.runs[index].text.len();
            if offset == start {
                return index;
            }
            if offset < start + len {
                let tail = self.runs[index].text.split_off(offset - start);
                let formatting = self.runs[index].formatting.clone();
                self.runs.insert(
                    index + 1,
                    Run {
                        text: tail,
                        formatting,
                    },
                );
                return index + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    fn normalize(&mut self) {
        self.runs.retain(|run| !run.text.is_empty());
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(last) if last.formatting == run.formatting => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// Index of the run containing the byte at `offset`, or the run ending
    /// there for a caret at the end of a run.
    fn run_index_at(&self, offset: usize, caret: bool) -> Option<usize> {
        let mut start = 0;
        for (index, run) in self.runs.iter().enumerate() {
            let end = start + run.text.len();
            let contains = if caret {
                offset > start && offset <= end
            } else {
                offset >= start && offset < end
            };
            if contains {
                return Some(index);
            }
            start = end;
        }
        // A caret at offset 0 inherits from the first run
        if caret && offset == 0 {
            return (!self.runs.is_empty()).then_some(0);
        }
        None
    }
}

impl Document for StyledDocument {
    fn body_text(&self) -> Result<Cow<'_, str>, HostError> {
        Ok(Cow::Owned(self.text()))
    }

    fn formatting_at(&self, selection: Selection) -> Result<Formatting, HostError> {
        selection.validate(&self.text())?;

        if selection.is_empty() {
            return Ok(self
                .run_index_at(selection.start(), true)
                .map(|index| self.runs[index].formatting.clone())
                .unwrap_or_default());
        }

        // Attributes that differ across the selection are reported as unset
        let mut start = 0;
        let mut result: Option<Formatting> = None;
        for run in &self.runs {
            let end = start + run.text.len();
            if end > selection.start() && start < selection.end() {
                result = Some(match result {
                    None => run.formatting.clone(),
                    Some(acc) => Formatting {
                        font_name: acc
                            .font_name
                            .filter(|f| Some(f) == run.formatting.font_name.as_ref()),
                        size: acc.size.filter(|s| Some(*s) == run.formatting.size),
                        color: acc
                            .color
                            .filter(|c| Some(c) == run.formatting.color.as_ref()),
                    },
                });
            }
            start = end;
        }
        Ok(result.unwrap_or_default())
    }

    fn replace(&mut self, selection: Selection, text: &str) -> Result<Selection, HostError> {
        selection.validate(&self.text())?;

        // New text takes the formatting of the text it replaces
        let inherited = self.formatting_at(Selection::caret(selection.start()))?;
        let inherited = if selection.is_empty() {
            inherited
        } else {
            self.run_index_at(selection.start(), false)
                .map(|index| self.runs[index].formatting.clone())
                .unwrap_or(inherited)
        };

        let first = self.split_at(selection.start());
        let last = self.split_at(selection.end());
        self.runs.splice(
            first..last,
            [Run {
                text: text.to_string(),
                formatting: inherited,
            }],
        );
        self.normalize();

        let inserted = Selection::new(selection.start(), selection.start() + text.len());
        self.selection = Some(Selection::caret(inserted.end()));
        Ok(inserted)
    }

    fn set_formatting(
        &mut self,
        selection: Selection,
        formatting: &Formatting,
    ) -> Result<(), HostError> {
        selection.validate(&self.text())?;
        if selection.is_empty() {
            return Ok(());
        }

        let first = self.split_at(selection.start());
        let last = self.split_at(selection.end());
        for run in &mut self.runs[first..last] {
            if let Some(font_name) = &formatting.font_name {
                run.formatting.font_name = Some(font_name.clone());
            }
            if let Some(size) = formatting.size {
                run.formatting.size = Some(size);
            }
            if let Some(color) = &formatting.color {
                run.formatting.color = Some(color.clone());
            }
        }
        self.normalize();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn font(name: &str, size: f32, color: &str) -> Formatting {
        Formatting {
            font_name: Some(name.to_string()),
            size: Some(size),
            color: Some(color.to_string()),
        }
    }

    fn sample() -> StyledDocument {
        StyledDocument::new()
            .with_run("Hello ", font("Calibri", 11.0, "#000000"))
            .with_run("world", font("Arial", 14.0, "#FF0000"))
    }

    #[test]
    fn adjacent_equal_runs_merge() {
        let doc = StyledDocument::new()
            .with_run("a", Formatting::default())
            .with_run("b", Formatting::default());
        assert_eq!(doc.runs().count(), 1);
        assert_eq!(doc.text(), "ab");
    }

    #[test]
    fn caret_formatting_comes_from_preceding_run() {
        let doc = sample();
        assert_eq!(
            doc.formatting_at(Selection::caret(6)).unwrap(),
            font("Calibri", 11.0, "#000000")
        );
        assert_eq!(
            doc.formatting_at(Selection::caret(7)).unwrap(),
            font("Arial", 14.0, "#FF0000")
        );
        assert_eq!(
            doc.formatting_at(Selection::caret(0)).unwrap(),
            font("Calibri", 11.0, "#000000")
        );
    }

    #[test]
    fn mixed_selection_reports_unset_attributes() {
        let doc = sample();
        let formatting = doc.formatting_at(Selection::new(4, 8)).unwrap();
        assert_eq!(formatting, Formatting::default());
    }

    #[test]
    fn replace_inserts_text_and_moves_caret() {
        let mut doc = sample();
        let inserted = doc.replace(Selection::new(6, 11), "there").unwrap();
        assert_eq!(inserted, Selection::new(6, 11));
        assert_eq!(doc.text(), "Hello there");
        assert_eq!(doc.selection(), Some(Selection::caret(11)));
    }

    #[test]
    fn set_formatting_stays_within_range() {
        let mut doc = StyledDocument::new().with_run("abcdef", Formatting::default());
        doc.set_formatting(Selection::new(2, 4), &font("Mono", 9.0, "#00FF00"))
            .unwrap();

        let runs: Vec<_> = doc.runs().map(|(text, f)| (text.to_string(), f.clone())).collect();
        assert_eq!(
            runs,
            vec![
                ("ab".to_string(), Formatting::default()),
                ("cd".to_string(), font("Mono", 9.0, "#00FF00")),
                ("ef".to_string(), Formatting::default()),
            ]
        );
    }

    #[test]
    fn select_notifies_observers_once_per_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut doc = sample();
        let sink = Rc::clone(&seen);
        doc.on_selection_changed(move |selection| sink.borrow_mut().push(selection));

        doc.select(Selection::new(0, 5)).unwrap();
        doc.select(Selection::new(0, 5)).unwrap();
        doc.select(Selection::caret(3)).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![Selection::new(0, 5), Selection::caret(3)]
        );
    }

    #[test]
    fn select_rejects_invalid_range() {
        let mut doc = sample();
        assert!(doc.select(Selection::new(0, 100)).is_err());
        assert_eq!(doc.selection(), None);
    }
}
