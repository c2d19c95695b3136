//! Ordered rule list with colour auto-cycling

use super::types::{normalize_color, ColorPalette, HighlightRule, RuleError};

/// Ordered list of highlight rules for one document
#[derive(Debug, Clone)]
pub struct RuleStore {
    rules: Vec<HighlightRule>,
    palette: ColorPalette,
    /// Colour used for the next rule when none is given
    selected_color: String,
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleStore {
    pub fn new() -> Self {
        Self::with_palette(ColorPalette::default())
    }

    pub fn with_palette(palette: ColorPalette) -> Self {
        let selected_color = palette.first().to_string();
        Self {
            rules: Vec::new(),
            palette,
            selected_color,
        }
    }

    /// Append a rule
    ///
    /// The description is trimmed. Without an explicit colour the currently
    /// selected colour is used. Either way the selection then advances to the
    /// palette entry after the colour that was selected.
    pub fn add(&mut self, description: &str, color: Option<&str>) -> Result<&HighlightRule, RuleError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(RuleError::EmptyDescription);
        }

        let color = match color {
            Some(c) => normalize_color(c)?,
            None => self.selected_color.clone(),
        };

        self.selected_color = self.palette.next_after(&self.selected_color).to_string();
        self.rules.push(HighlightRule::new(color, description));

        let index = self.rules.len() - 1;
        Ok(&self.rules[index])
    }

    /// Remove the rule at `index`, keeping the order of the others
    pub fn remove(&mut self, index: usize) -> Result<HighlightRule, RuleError> {
        if index >= self.rules.len() {
            return Err(RuleError::IndexOutOfRange {
                index,
                len: self.rules.len(),
            });
        }
        Ok(self.rules.remove(index))
    }

    /// Override the colour for the next rule
    pub fn select_color(&mut self, color: &str) -> Result<(), RuleError> {
        self.selected_color = normalize_color(color)?;
        Ok(())
    }

    pub fn selected_color(&self) -> &str {
        &self.selected_color
    }

    pub fn rules(&self) -> &[HighlightRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Colours offered for new rules
    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }
}
