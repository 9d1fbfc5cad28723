//! Lock impact of an ALTER on a foreign-key-linked table

use crate::fkresolver::graph::LockImpact;
use crate::meta::{ActionKind, AlterAction, ForeignKeyMeta, LockLevel};

/// Decide what lock `fk`'s other side takes, given every action of the statement.
///
/// Dropping or retyping a column that belongs to the constraint forces InnoDB to
/// revalidate it, which escalates to an exclusive lock. Anything else still takes
/// a shared metadata lock across the link.
pub fn determine_lock_impact(actions: &[AlterAction], fk: &ForeignKeyMeta) -> LockImpact {
    for action in actions {
        let detail = &action.detail;
        match action.kind {
            ActionKind::DropColumn if fk.involves_column(&detail.column_name) => {
                return LockImpact {
                    metadata_lock: true,
                    lock_level: LockLevel::Exclusive,
                    reason: format!(
                        "DROP COLUMN on FK column {}: implicit FK constraint change",
                        detail.column_name
                    ),
                };
            }
            ActionKind::ModifyColumn | ActionKind::ChangeColumn | ActionKind::RenameColumn => {
                if action.kind == ActionKind::RenameColumn && !changes_type(action) {
                    continue;
                }
                if let Some(column) = targeted_fk_column(action, fk) {
                    return LockImpact {
                        metadata_lock: true,
                        lock_level: LockLevel::Exclusive,
                        reason: format!(
                            "Column type change on FK column {} ({}): FK validation required",
                            column, action.kind
                        ),
                    };
                }
            }
            _ => {}
        }
    }

    LockImpact {
        metadata_lock: true,
        lock_level: LockLevel::Shared,
        reason: format!(
            "FK: {}.{} -> {}.{}",
            fk.source_table,
            fk.source_columns.join(", "),
            fk.referenced_table,
            fk.referenced_columns.join(", ")
        ),
    }
}

/// A plain RENAME COLUMN carries no type; only a retyping rename counts
fn changes_type(action: &AlterAction) -> bool {
    let detail = &action.detail;
    !detail.column_type.is_empty() && !detail.column_type.eq_ignore_ascii_case(&detail.old_column_type)
}

/// Name of the constraint column the action touches, checking the new name then the old one
fn targeted_fk_column<'a>(action: &'a AlterAction, fk: &ForeignKeyMeta) -> Option<&'a str> {
    [&action.detail.column_name, &action.detail.old_column_name]
        .into_iter()
        .filter(|name| !name.is_empty())
        .find(|name| fk.involves_column(name))
        .map(|name| name.as_str())
}
