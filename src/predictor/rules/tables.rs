//! Table-level rules: rename, engine, charset, row format and friends

use super::{Outcome, Rule, RuleSet};
use crate::meta::{ActionKind, Algorithm, LockLevel};

pub(super) fn rules() -> Vec<(ActionKind, RuleSet)> {
    vec![
        (
            ActionKind::RenameTable,
            RuleSet::Fixed(
                Outcome::new("RENAME TABLE", Algorithm::Instant, LockLevel::None, false)
                    .notes(&["Metadata-only change"]),
            ),
        ),
        (
            ActionKind::ChangeEngine,
            RuleSet::Ordered(vec![
                Rule::when(
                    |ctx| {
                        ctx.table
                            .is_some_and(|t| t.engine.eq_ignore_ascii_case(&ctx.action.detail.engine))
                    },
                    Outcome::new(
                        "CHANGE ENGINE (same engine, null rebuild)",
                        Algorithm::Inplace,
                        LockLevel::None,
                        true,
                    )
                    .notes(&["Same engine: table rebuild for defragmentation (equivalent to ALTER TABLE ... FORCE)"]),
                ),
                Rule::otherwise(
                    Outcome::new(
                        "CHANGE ENGINE (different engine)",
                        Algorithm::Copy,
                        LockLevel::Shared,
                        true,
                    )
                    .warnings(&[
                        "SHARED lock: DML writes blocked during execution",
                        "Engine conversion requires full table copy",
                    ]),
                ),
            ]),
        ),
        (
            ActionKind::ConvertCharacterSet,
            RuleSet::Fixed(
                Outcome::new("CONVERT CHARACTER SET", Algorithm::Inplace, LockLevel::Shared, true)
                    .notes(&["INPLACE algorithm with table rebuild when character encoding differs"])
                    .warnings(&[
                        "SHARED lock: DML writes blocked during execution",
                        "Table rebuild required if new character encoding differs from current",
                    ]),
            ),
        ),
        (
            ActionKind::ChangeRowFormat,
            RuleSet::Fixed(
                Outcome::new("CHANGE ROW_FORMAT", Algorithm::Inplace, LockLevel::None, true)
                    .notes(&["ROW_FORMAT change requires table rebuild"]),
            ),
        ),
        (
            ActionKind::ChangeKeyBlockSize,
            RuleSet::Fixed(
                Outcome::new("CHANGE KEY_BLOCK_SIZE", Algorithm::Inplace, LockLevel::None, true)
                    .notes(&["KEY_BLOCK_SIZE change requires table rebuild"]),
            ),
        ),
        (
            ActionKind::ChangeAutoIncrement,
            RuleSet::Fixed(
                Outcome::new("CHANGE AUTO_INCREMENT value", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Only modifies the in-memory auto-increment counter, not the data file"]),
            ),
        ),
        (
            ActionKind::ForceRebuild,
            RuleSet::Fixed(
                Outcome::new("ALTER TABLE ... FORCE (rebuild)", Algorithm::Inplace, LockLevel::None, true)
                    .notes(&["Online table rebuild: equivalent to ALTER TABLE ... ENGINE=InnoDB"])
                    .warnings(&["Table rebuild required: may take significant time for large tables"]),
            ),
        ),
        (
            ActionKind::SpecifyCharacterSet,
            RuleSet::Fixed(
                Outcome::new("SPECIFY CHARACTER SET", Algorithm::Inplace, LockLevel::None, true).notes(&[
                    "Changes the default character set for the table (does not convert existing columns)",
                    "Rebuilds table if new character encoding differs from current",
                    "Different from CONVERT TO CHARACTER SET which converts all existing columns",
                ]),
            ),
        ),
        (
            ActionKind::SetTableStats,
            RuleSet::Fixed(
                Outcome::new("SET TABLE STATISTICS", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Metadata-only change: modifies persistent statistics settings"]),
            ),
        ),
        (
            ActionKind::TableEncryption,
            RuleSet::Fixed(
                Outcome::new("TABLE ENCRYPTION", Algorithm::Copy, LockLevel::Shared, true).warnings(&[
                    "SHARED lock: DML writes blocked during encryption change",
                    "Table rebuild required: full table copy for encryption/decryption",
                ]),
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::{RuleContext, RuleTable};
    use super::*;
    use crate::meta::{ActionDetail, AlterAction, TableSnapshot};
    use crate::predictor::PredictOptions;
    use pretty_assertions::assert_eq;

    fn change_engine(engine: &str, table: Option<&TableSnapshot>) -> Algorithm {
        let rules = RuleTable::new();
        let options = PredictOptions::default();
        let action = AlterAction::with_detail(
            ActionKind::ChangeEngine,
            ActionDetail {
                engine: engine.into(),
                ..Default::default()
            },
        );
        let ctx = RuleContext {
            action: &action,
            table,
            options: &options,
        };
        rules.evaluate(&ctx).map(|o| o.algorithm).unwrap()
    }

    #[test]
    fn test_change_engine_same_engine_is_null_rebuild() {
        let table = TableSnapshot {
            engine: "InnoDB".into(),
            ..Default::default()
        };
        assert_eq!(change_engine("innodb", Some(&table)), Algorithm::Inplace);
        assert_eq!(change_engine("MyISAM", Some(&table)), Algorithm::Copy);
        assert_eq!(change_engine("InnoDB", None), Algorithm::Copy);
    }
}
