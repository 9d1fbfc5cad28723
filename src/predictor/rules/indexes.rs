//! Index, primary key and foreign key rules

use super::{Outcome, Rule, RuleSet};
use crate::meta::{ActionKind, Algorithm, LockLevel};

const SHARED_DURING_INDEX_BUILD: &str = "SHARED lock: DML writes blocked during index creation";

pub(super) fn rules() -> Vec<(ActionKind, RuleSet)> {
    vec![
        (
            ActionKind::AddIndex,
            RuleSet::Fixed(
                Outcome::new("ADD INDEX", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Online index creation: DML allowed during build"]),
            ),
        ),
        (
            ActionKind::AddUniqueIndex,
            RuleSet::Fixed(
                Outcome::new("ADD UNIQUE INDEX", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Online index creation: DML allowed during build"]),
            ),
        ),
        (
            ActionKind::AddFulltextIndex,
            RuleSet::Ordered(vec![
                // First FULLTEXT index adds the hidden FTS_DOC_ID column
                Rule::when(
                    |ctx| ctx.table.is_some_and(|t| !t.has_fulltext_index()),
                    Outcome::new(
                        "ADD FULLTEXT INDEX (first on table)",
                        Algorithm::Inplace,
                        LockLevel::Shared,
                        true,
                    )
                    .notes(&["First FULLTEXT index may require table rebuild if no user-defined FTS_DOC_ID column"])
                    .warnings(&[SHARED_DURING_INDEX_BUILD, "Table rebuild may be required"]),
                ),
                Rule::otherwise(
                    Outcome::new("ADD FULLTEXT INDEX", Algorithm::Inplace, LockLevel::Shared, false)
                        .notes(&["FULLTEXT index creation requires SHARED lock"])
                        .warnings(&[SHARED_DURING_INDEX_BUILD]),
                ),
            ]),
        ),
        (
            ActionKind::AddSpatialIndex,
            RuleSet::Fixed(
                Outcome::new("ADD SPATIAL INDEX", Algorithm::Inplace, LockLevel::Shared, false)
                    .notes(&["SPATIAL index creation requires at minimum LOCK=SHARED"])
                    .warnings(&[SHARED_DURING_INDEX_BUILD]),
            ),
        ),
        (
            ActionKind::DropIndex,
            RuleSet::Fixed(
                Outcome::new("DROP INDEX", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Metadata-only change"]),
            ),
        ),
        (
            ActionKind::RenameIndex,
            RuleSet::Fixed(
                Outcome::new("RENAME INDEX", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Metadata-only change"]),
            ),
        ),
        (
            ActionKind::AddPrimaryKey,
            RuleSet::Fixed(
                Outcome::new("ADD PRIMARY KEY", Algorithm::Inplace, LockLevel::None, true)
                    .notes(&[
                        "Table rebuild required: clustered index recreation",
                        "ALGORITHM=INPLACE is not permitted if columns must be converted to NOT NULL",
                    ])
                    .warnings(&["Table rebuild required: expensive operation for large tables"]),
            ),
        ),
        (
            ActionKind::DropPrimaryKey,
            RuleSet::Fixed(
                Outcome::new("DROP PRIMARY KEY", Algorithm::Copy, LockLevel::Shared, true).warnings(&[
                    "SHARED lock: DML writes blocked during execution",
                    "Table rebuild required: full table copy",
                    "Consider dropping and adding primary key in a single ALTER TABLE statement for INPLACE support",
                ]),
            ),
        ),
        (
            ActionKind::AddForeignKey,
            RuleSet::Ordered(vec![
                Rule::when(
                    |ctx| !ctx.options.foreign_key_checks,
                    Outcome::new(
                        "ADD FOREIGN KEY (foreign_key_checks=OFF)",
                        Algorithm::Inplace,
                        LockLevel::None,
                        false,
                    )
                    .notes(&[
                        "ALGORITHM=INPLACE with LOCK=NONE because foreign_key_checks=OFF",
                        "Existing rows are not validated against the referenced table",
                    ]),
                ),
                Rule::otherwise(
                    Outcome::new("ADD FOREIGN KEY", Algorithm::Copy, LockLevel::Shared, false)
                        .notes(&[
                            "Default behavior with foreign_key_checks=ON (default): ALGORITHM=COPY",
                            "ALGORITHM=INPLACE with LOCK=NONE is available only when foreign_key_checks=OFF",
                        ])
                        .warnings(&[
                            "SHARED lock: DML writes blocked during execution; set foreign_key_checks=OFF for INPLACE operation",
                        ]),
                ),
            ]),
        ),
        (
            ActionKind::DropForeignKey,
            RuleSet::Fixed(
                Outcome::new("DROP FOREIGN KEY", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Metadata-only change"]),
            ),
        ),
    ]
}
