//! Layout of the ledger document

use serde::{Deserialize, Serialize};

/// Default title of the transaction tab
pub const DEFAULT_LEDGER_TAB: &str = "Sheet1";

/// Default title of the key/value settings tab
pub const DEFAULT_SETTINGS_TAB: &str = "Settings";

/// Tab titles inside the spreadsheet document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLayout {
    /// Tab holding one row per transaction (columns A-M)
    #[serde(default = "default_ledger_tab")]
    pub ledger_tab: String,

    /// Tab holding `Key,Value` rows (columns A-B)
    #[serde(default = "default_settings_tab")]
    pub settings_tab: String,
}

fn default_ledger_tab() -> String {
    DEFAULT_LEDGER_TAB.to_string()
}

fn default_settings_tab() -> String {
    DEFAULT_SETTINGS_TAB.to_string()
}

impl Default for LedgerLayout {
    fn default() -> Self {
        Self {
            ledger_tab: default_ledger_tab(),
            settings_tab: default_settings_tab(),
        }
    }
}

impl LedgerLayout {
    /// Both tabs must be named and distinct
    pub fn validate(&self) -> crate::Result<()> {
        if self.ledger_tab.trim().is_empty() || self.settings_tab.trim().is_empty() {
            return Err(crate::Error::Config("tab titles cannot be empty".to_string()));
        }
        if self.ledger_tab == self.settings_tab {
            return Err(crate::Error::Config(format!(
                "ledger and settings tabs must differ (both are {:?})",
                self.ledger_tab
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = LedgerLayout::default();
        assert_eq!(layout.ledger_tab, "Sheet1");
        assert_eq!(layout.settings_tab, "Settings");
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_same_tab_rejected() {
        let layout = LedgerLayout {
            ledger_tab: "Data".to_string(),
            settings_tab: "Data".to_string(),
        };
        assert!(matches!(layout.validate(), Err(crate::Error::Config(_))));
    }
}
