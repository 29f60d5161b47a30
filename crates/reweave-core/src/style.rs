// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Formatting configuration handed to formatting collaborators.

use serde::{Deserialize, Serialize};

/// Indentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabsAndIndentsStyle {
    pub use_tab_character: bool,
    pub tab_size: usize,
    pub indent_size: usize,
    pub continuation_indent_size: usize,
}

impl Default for TabsAndIndentsStyle {
    fn default() -> Self {
        TabsAndIndentsStyle {
            use_tab_character: false,
            tab_size: 4,
            indent_size: 4,
            continuation_indent_size: 8,
        }
    }
}

impl TabsAndIndentsStyle {
    /// One indentation step.
    pub fn indent_unit(&self) -> String {
        self.render(self.indent_size)
    }

    /// One continuation step.
    pub fn continuation_unit(&self) -> String {
        self.render(self.continuation_indent_size)
    }

    /// `columns` of indentation, as tabs and spaces when tabs are enabled.
    pub fn render(&self, columns: usize) -> String {
        if self.use_tab_character && self.tab_size > 0 {
            let mut s = "\t".repeat(columns / self.tab_size);
            s.push_str(&" ".repeat(columns % self.tab_size));
            s
        } else {
            " ".repeat(columns)
        }
    }
}

/// All styles in effect for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Styles {
    pub tabs_and_indents: TabsAndIndentsStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let style = TabsAndIndentsStyle::default();
        assert_eq!(style.indent_unit(), "    ");
        assert_eq!(style.continuation_unit(), "        ");
    }

    #[test]
    fn tabs() {
        let style = TabsAndIndentsStyle {
            use_tab_character: true,
            ..TabsAndIndentsStyle::default()
        };
        assert_eq!(style.continuation_unit(), "\t\t");
        assert_eq!(style.render(6), "\t  ");
    }
}
