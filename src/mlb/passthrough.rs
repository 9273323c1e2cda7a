//! # Passthrough Merger
//!
//! Builds a frame's field map from an observed stock frame plus the fields the
//! encoder computed. The stock part is either an explicit allow-list or the
//! whole frame; computed fields always win on collision.

use super::protocol::{FieldMap, StockFrame};
use crate::error::Result;

/// Which stock signals seed the outgoing frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughMerger {
    /// Copy only the named signals; every one of them must be present
    AllowList(&'static [&'static str]),
    /// Copy every signal of the stock frame
    Verbatim,
}

impl PassthroughMerger {
    /// Merge `computed` on top of the selected stock signals.
    ///
    /// The stock frame is never modified.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if an allow-listed signal is absent from `stock`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use mlb_can::mlb::passthrough::PassthroughMerger;
    /// use mlb_can::mlb::protocol::{FieldMap, StockFrame};
    ///
    /// let stock = StockFrame::new("LS_01", BTreeMap::from([
    ///     ("LS_Codierung".to_string(), 2.0),
    ///     ("LS_Tip_Setzen".to_string(), 1.0),
    /// ]));
    /// let mut computed = FieldMap::new();
    /// computed.insert("LS_Abbrechen", 1.0);
    ///
    /// let fields = PassthroughMerger::AllowList(&["LS_Codierung"])
    ///     .merge(&stock, computed)
    ///     .unwrap();
    /// assert_eq!(fields.len(), 2);
    /// assert!(!fields.contains("LS_Tip_Setzen"));
    /// ```
    pub fn merge(&self, stock: &StockFrame, computed: FieldMap) -> Result<FieldMap> {
        let mut fields = match self {
            Self::AllowList(signals) => {
                let mut base = FieldMap::new();
                for &signal in signals.iter() {
                    base.insert(signal, stock.get(signal)?);
                }
                base
            }
            Self::Verbatim => stock.to_field_map(),
        };

        fields.overlay(computed);
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MlbCanError;
    use std::collections::BTreeMap;

    fn stock() -> StockFrame {
        StockFrame::new(
            "LDW_02",
            BTreeMap::from([
                ("A".to_string(), 1.0),
                ("B".to_string(), 2.0),
                ("C".to_string(), 3.0),
            ]),
        )
    }

    #[test]
    fn test_allow_list_copies_only_named() {
        let fields = PassthroughMerger::AllowList(&["A", "C"])
            .merge(&stock(), FieldMap::new())
            .unwrap();
        assert_eq!(fields.signals().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(fields.get("C"), Some(3.0));
    }

    #[test]
    fn test_allow_list_missing_field() {
        let result = PassthroughMerger::AllowList(&["A", "Z"]).merge(&stock(), FieldMap::new());
        match result {
            Err(MlbCanError::MissingField { field, .. }) => assert_eq!(field, "Z"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_verbatim_copies_everything() {
        let fields = PassthroughMerger::Verbatim.merge(&stock(), FieldMap::new()).unwrap();
        assert_eq!(fields, stock().to_field_map());
    }

    #[test]
    fn test_computed_fields_win() {
        let mut computed = FieldMap::new();
        computed.insert("B", 20.0);
        computed.insert("D", 4.0);

        let fields = PassthroughMerger::Verbatim.merge(&stock(), computed).unwrap();
        assert_eq!(fields.get("A"), Some(1.0));
        assert_eq!(fields.get("B"), Some(20.0));
        assert_eq!(fields.get("D"), Some(4.0));
    }

    #[test]
    fn test_stock_frame_untouched() {
        let original = stock();
        let mut computed = FieldMap::new();
        computed.insert("A", 99.0);
        let _ = PassthroughMerger::Verbatim.merge(&original, computed).unwrap();
        assert_eq!(original.get("A").unwrap(), 1.0);
    }
}
