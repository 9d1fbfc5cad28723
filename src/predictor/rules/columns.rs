//! Column rules: ADD / DROP / RENAME / MODIFY / CHANGE and default changes

use super::{enum_or_set_base, varchar_length, Outcome, Rule, RuleContext, RuleSet};
use crate::meta::{ActionKind, Algorithm, ColumnMeta, GeneratedKind, LockLevel};

const REBUILD_TAKES_TIME: &str = "Table rebuild required: may take significant time for large tables";
const COPY_WARNINGS: &[&str] = &[
    "SHARED lock: DML writes blocked during execution",
    "Table rebuild required: full table copy",
    "Consider using pt-online-schema-change or gh-ost for large tables",
];

pub(super) fn rules() -> Vec<(ActionKind, RuleSet)> {
    vec![
        (ActionKind::AddColumn, RuleSet::Ordered(add_column())),
        (ActionKind::DropColumn, RuleSet::Ordered(drop_column())),
        (ActionKind::RenameColumn, RuleSet::Ordered(rename_column())),
        (
            ActionKind::AlterColumnSetDefault,
            RuleSet::Fixed(
                Outcome::new("ALTER COLUMN SET DEFAULT", Algorithm::Instant, LockLevel::None, false)
                    .notes(&["Metadata-only change"]),
            ),
        ),
        (
            ActionKind::AlterColumnDropDefault,
            RuleSet::Fixed(
                Outcome::new("ALTER COLUMN DROP DEFAULT", Algorithm::Instant, LockLevel::None, false)
                    .notes(&["Metadata-only change"]),
            ),
        ),
        (ActionKind::ModifyColumn, RuleSet::Ordered(modify_column())),
        (ActionKind::ChangeColumn, RuleSet::Ordered(change_column())),
    ]
}

// =============================================================================
// ADD COLUMN
// =============================================================================

fn add_column() -> Vec<Rule> {
    vec![
        Rule::when(
            |ctx| ctx.action.detail.is_auto_increment,
            Outcome::new("ADD COLUMN (auto-increment)", Algorithm::Inplace, LockLevel::Shared, true)
                .notes(&["Auto-increment column requires ALGORITHM=INPLACE with LOCK=SHARED"])
                .warnings(&[
                    "SHARED lock: DML writes blocked during column addition",
                    "Table rebuild required: INPLACE ADD COLUMN with auto-increment",
                ]),
        ),
        Rule::when(
            |ctx| ctx.action.detail.generated_type == Some(GeneratedKind::Stored),
            Outcome::new("ADD COLUMN (STORED generated)", Algorithm::Copy, LockLevel::Shared, true)
                .warnings(&[
                    "STORED generated column requires ALGORITHM=COPY",
                    "SHARED lock: DML writes blocked during operation",
                    "Table rebuild required: server must evaluate expression for each row",
                ]),
        ),
        Rule::when(
            |ctx| {
                ctx.action.detail.generated_type == Some(GeneratedKind::Virtual)
                    && ctx.table.is_some_and(|t| t.is_partitioned)
            },
            Outcome::new(
                "ADD COLUMN (VIRTUAL generated, partitioned table)",
                Algorithm::Copy,
                LockLevel::Shared,
                true,
            )
            .warnings(&[
                "VIRTUAL generated column on partitioned table requires ALGORITHM=COPY",
                "SHARED lock: DML writes blocked during operation",
                "Table rebuild required",
            ]),
        ),
        Rule::when(
            |ctx| ctx.action.detail.generated_type == Some(GeneratedKind::Virtual),
            Outcome::new("ADD COLUMN (VIRTUAL generated)", Algorithm::Instant, LockLevel::None, false)
                .notes(&["VIRTUAL generated column: INSTANT for non-partitioned tables (MySQL 8.0+)"]),
        ),
        Rule::when(
            |ctx| ctx.action.detail.is_trailing() && ctx.action.detail.resolved_nullable(),
            Outcome::new("ADD COLUMN (trailing, NULLABLE)", Algorithm::Instant, LockLevel::None, false)
                .notes(&[
                    "INSTANT algorithm available (MySQL 8.0.12+)",
                    "No table rebuild required",
                    "DML operations are not blocked",
                ]),
        ),
        Rule::when(
            |ctx| ctx.action.detail.resolved_nullable(),
            Outcome::new(
                "ADD COLUMN (non-trailing, NULLABLE)",
                Algorithm::Instant,
                LockLevel::None,
                false,
            )
            .notes(&["INSTANT algorithm available (MySQL 8.0.29+)", "No table rebuild required"]),
        ),
        Rule::when(
            |ctx| ctx.action.detail.is_trailing(),
            Outcome::new("ADD COLUMN (trailing, NOT NULL)", Algorithm::Instant, LockLevel::None, false)
                .notes(&[
                    "INSTANT algorithm available (MySQL 8.0.12+)",
                    "NOT NULL column requires a DEFAULT value (explicit or implicit)",
                ]),
        ),
        Rule::otherwise(
            Outcome::new(
                "ADD COLUMN (non-trailing, NOT NULL)",
                Algorithm::Instant,
                LockLevel::None,
                false,
            )
            .notes(&[
                "INSTANT algorithm available (MySQL 8.0.29+)",
                "NOT NULL column requires a DEFAULT value (explicit or implicit)",
            ]),
        ),
    ]
}

// =============================================================================
// DROP / RENAME COLUMN
// =============================================================================

fn target_column<'a>(ctx: &RuleContext<'a>) -> Option<&'a ColumnMeta> {
    ctx.table
        .and_then(|table| table.column(&ctx.action.detail.column_name))
}

fn drop_column() -> Vec<Rule> {
    vec![
        Rule::when(
            |ctx| target_column(ctx).is_some_and(ColumnMeta::is_stored_generated),
            Outcome::new("DROP COLUMN (STORED generated)", Algorithm::Inplace, LockLevel::None, true)
                .notes(&["Dropping STORED generated column requires table rebuild"])
                .warnings(&[REBUILD_TAKES_TIME]),
        ),
        Rule::when(
            |ctx| {
                ctx.table.is_some_and(|t| t.is_partitioned)
                    && target_column(ctx).is_some_and(ColumnMeta::is_virtual_generated)
            },
            Outcome::new(
                "DROP COLUMN (VIRTUAL generated, partitioned table)",
                Algorithm::Copy,
                LockLevel::Shared,
                true,
            )
            .warnings(&[
                "VIRTUAL generated column on partitioned table requires ALGORITHM=COPY",
                "SHARED lock: DML writes blocked during operation",
                "Table rebuild required",
            ]),
        ),
        Rule::when(
            |ctx| target_column(ctx).is_some_and(ColumnMeta::is_virtual_generated),
            Outcome::new("DROP COLUMN (VIRTUAL generated)", Algorithm::Instant, LockLevel::None, false)
                .notes(&["INSTANT algorithm for VIRTUAL generated column (MySQL 8.0+)"]),
        ),
        Rule::otherwise(
            Outcome::new("DROP COLUMN", Algorithm::Instant, LockLevel::None, true).notes(&[
                "INSTANT algorithm available (MySQL 8.0.29+)",
                "Existing rows retain dropped column data until rewritten",
            ]),
        ),
    ]
}

fn rename_column() -> Vec<Rule> {
    vec![
        Rule::when(
            |ctx| {
                let detail = &ctx.action.detail;
                let name = if detail.old_column_name.is_empty() {
                    &detail.column_name
                } else {
                    &detail.old_column_name
                };
                ctx.table.is_some_and(|t| t.is_referenced_column(name))
            },
            Outcome::new(
                "RENAME COLUMN (referenced by foreign key)",
                Algorithm::Inplace,
                LockLevel::None,
                false,
            )
            .notes(&["Column referenced by foreign key: requires ALGORITHM=INPLACE (INSTANT not available)"]),
        ),
        Rule::otherwise(
            Outcome::new("RENAME COLUMN", Algorithm::Instant, LockLevel::None, false)
                .notes(&["INSTANT algorithm available (MySQL 8.0.28+)"]),
        ),
    ]
}

// =============================================================================
// MODIFY / CHANGE COLUMN
// =============================================================================

fn is_generated_reorder(ctx: &RuleContext<'_>) -> bool {
    !ctx.action.detail.is_trailing() && target_column(ctx).is_some_and(ColumnMeta::is_generated)
}

fn is_enum_or_set_extension(ctx: &RuleContext<'_>) -> bool {
    let Some(new_base) = enum_or_set_base(&ctx.action.detail.column_type) else {
        return false;
    };
    target_column(ctx).is_some_and(|col| enum_or_set_base(&col.column_type) == Some(new_base))
}

fn is_varchar_growth_same_length_bytes(ctx: &RuleContext<'_>) -> bool {
    let Some(new_len) = varchar_length(&ctx.action.detail.column_type) else {
        return false;
    };
    let Some(old_len) = target_column(ctx).and_then(|col| varchar_length(&col.column_type)) else {
        return false;
    };
    if old_len == 0 || new_len <= old_len {
        return false;
    }
    (old_len <= 255 && new_len <= 255) || (old_len >= 256 && new_len >= 256)
}

fn same_type_column<'a>(ctx: &RuleContext<'a>) -> Option<&'a ColumnMeta> {
    target_column(ctx).filter(|col| col.same_type_as(&ctx.action.detail.column_type))
}

fn modify_column() -> Vec<Rule> {
    vec![
        Rule::when(
            is_generated_reorder,
            Outcome::new(
                "MODIFY COLUMN (generated column reorder)",
                Algorithm::Copy,
                LockLevel::Shared,
                true,
            )
            .warnings(&[
                "Modifying generated column order requires ALGORITHM=COPY",
                "SHARED lock: DML writes blocked during operation",
            ]),
        ),
        Rule::when(
            is_enum_or_set_extension,
            Outcome::new("MODIFY COLUMN (ENUM/SET extension)", Algorithm::Instant, LockLevel::None, false)
                .notes(&[
                    "INSTANT when adding new members to the end of the list without changing storage size",
                    "Adding members in the middle or changing storage size requires COPY",
                ]),
        ),
        Rule::when(
            is_varchar_growth_same_length_bytes,
            Outcome::new("MODIFY COLUMN (VARCHAR extension)", Algorithm::Inplace, LockLevel::None, false)
                .notes(&[
                    "VARCHAR extension within same length-byte boundary: in-place, metadata-only",
                    "Crossing the 255/256 byte boundary requires ALGORITHM=COPY (length prefix grows from 1 to 2 bytes)",
                ]),
        ),
        Rule::when(
            |ctx| {
                same_type_column(ctx).is_some_and(|col| col.is_nullable)
                    && !ctx.action.detail.resolved_nullable()
            },
            Outcome::new("MODIFY COLUMN (NULL -> NOT NULL)", Algorithm::Inplace, LockLevel::None, true)
                .notes(&[
                    "INPLACE algorithm with table rebuild (NULL -> NOT NULL conversion)",
                    "Requires STRICT_ALL_TABLES or STRICT_TRANS_TABLES SQL mode",
                ])
                .warnings(&[
                    "Table rebuild required: data validation for NOT NULL constraint; fails if column contains NULL values",
                ]),
        ),
        Rule::when(
            |ctx| {
                same_type_column(ctx).is_some_and(|col| !col.is_nullable)
                    && ctx.action.detail.resolved_nullable()
            },
            Outcome::new("MODIFY COLUMN (NOT NULL -> NULL)", Algorithm::Inplace, LockLevel::None, true)
                .notes(&["INPLACE algorithm with table rebuild (NOT NULL -> NULL conversion)"])
                .warnings(&[REBUILD_TAKES_TIME]),
        ),
        Rule::when(
            |ctx| {
                !ctx.action.detail.is_trailing()
                    && same_type_column(ctx)
                        .is_some_and(|col| col.is_nullable == ctx.action.detail.resolved_nullable())
            },
            Outcome::new("MODIFY COLUMN (reorder columns)", Algorithm::Inplace, LockLevel::None, true)
                .notes(&["Reordering columns requires table rebuild"])
                .warnings(&[REBUILD_TAKES_TIME]),
        ),
        // Without a snapshot the type change cannot be ruled out
        Rule::when(
            |ctx| match target_column(ctx) {
                Some(col) => !col.same_type_as(&ctx.action.detail.column_type),
                None => true,
            },
            Outcome::new("MODIFY COLUMN (type change)", Algorithm::Copy, LockLevel::Shared, true)
                .warnings(COPY_WARNINGS),
        ),
        Rule::otherwise(
            Outcome::new("MODIFY COLUMN (rebuild)", Algorithm::Inplace, LockLevel::None, true)
                .notes(&["INPLACE table rebuild (same type re-specification)"])
                .warnings(&[REBUILD_TAKES_TIME]),
        ),
    ]
}

fn change_column() -> Vec<Rule> {
    vec![
        Rule::when(
            |ctx| {
                let detail = &ctx.action.detail;
                ctx.table
                    .and_then(|t| t.column(&detail.old_column_name))
                    .is_some_and(|col| col.same_type_as(&detail.column_type))
            },
            Outcome::new("CHANGE COLUMN (rename only)", Algorithm::Instant, LockLevel::None, false)
                .notes(&["INSTANT algorithm available (MySQL 8.0.28+): rename only, same data type"]),
        ),
        Rule::otherwise(
            Outcome::new("CHANGE COLUMN (type change)", Algorithm::Copy, LockLevel::Shared, true)
                .warnings(COPY_WARNINGS),
        ),
    ]
}
