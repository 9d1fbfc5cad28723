//! Partition maintenance rules

use super::{Outcome, Rule, RuleContext, RuleSet};
use crate::meta::{ActionKind, Algorithm, LockLevel};

const PARTITION_DATA_LOSS: &str = "Data in the partition will be permanently deleted";
const DEFAULT_ONLY: &str = "Only ALGORITHM=DEFAULT and LOCK=DEFAULT are permitted by MySQL";

fn hash_or_key_partitioned(ctx: &RuleContext<'_>) -> bool {
    ctx.table.is_some_and(|t| t.is_hash_or_key_partitioned())
}

pub(super) fn rules() -> Vec<(ActionKind, RuleSet)> {
    vec![
        (
            ActionKind::AddPartition,
            RuleSet::Ordered(vec![
                Rule::when(
                    hash_or_key_partitioned,
                    Outcome::new("ADD PARTITION (HASH/KEY)", Algorithm::Inplace, LockLevel::Shared, false)
                        .notes(&["HASH/KEY partition: data is copied between partitions"])
                        .warnings(&["SHARED lock: DML writes blocked during partition addition"]),
                ),
                Rule::otherwise(
                    Outcome::new("ADD PARTITION", Algorithm::Inplace, LockLevel::None, false).notes(&[
                        "INPLACE for RANGE/LIST partitions: no data copying",
                        "For HASH/KEY partitions: data is copied between partitions and requires LOCK=SHARED",
                    ]),
                ),
            ]),
        ),
        (
            ActionKind::DropPartition,
            RuleSet::Ordered(vec![
                Rule::when(
                    hash_or_key_partitioned,
                    Outcome::new("DROP PARTITION (HASH/KEY)", Algorithm::Inplace, LockLevel::Shared, false)
                        .notes(&["HASH/KEY partition: data is redistributed between remaining partitions"])
                        .warnings(&[
                            "SHARED lock: DML writes blocked during partition drop",
                            PARTITION_DATA_LOSS,
                        ]),
                ),
                Rule::otherwise(
                    Outcome::new("DROP PARTITION", Algorithm::Inplace, LockLevel::None, false)
                        .notes(&["Deletes data stored in the partition and drops it"])
                        .warnings(&[PARTITION_DATA_LOSS]),
                ),
            ]),
        ),
        (
            ActionKind::TruncatePartition,
            RuleSet::Fixed(
                Outcome::new("TRUNCATE PARTITION", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Truncates data in the partition without dropping it"]),
            ),
        ),
        (
            ActionKind::ExchangePartition,
            RuleSet::Fixed(
                Outcome::new("EXCHANGE PARTITION", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Exchanges partition data with a non-partitioned table"]),
            ),
        ),
        (
            ActionKind::CoalescePartition,
            RuleSet::Fixed(
                Outcome::new("COALESCE PARTITION", Algorithm::Inplace, LockLevel::Shared, false)
                    .notes(&["Data is copied between partitions"])
                    .warnings(&["SHARED lock: DML writes blocked during partition coalescing"]),
            ),
        ),
        (
            ActionKind::ReorganizePartition,
            RuleSet::Fixed(
                Outcome::new("REORGANIZE PARTITION", Algorithm::Inplace, LockLevel::Shared, false)
                    .notes(&["Data is copied between partitions"])
                    .warnings(&["SHARED lock: DML writes blocked during partition reorganization"]),
            ),
        ),
        (
            ActionKind::RebuildPartition,
            RuleSet::Fixed(
                Outcome::new("REBUILD PARTITION", Algorithm::Inplace, LockLevel::Shared, false)
                    .warnings(&["SHARED lock: DML writes blocked during partition rebuild"]),
            ),
        ),
        (
            ActionKind::PartitionBy,
            RuleSet::Fixed(
                Outcome::new("PARTITION BY", Algorithm::Copy, LockLevel::Shared, true).warnings(&[
                    "SHARED lock: DML writes blocked during operation",
                    "Table rebuild required: partitioning structure change",
                ]),
            ),
        ),
        (
            ActionKind::RemovePartitioning,
            RuleSet::Fixed(
                Outcome::new("REMOVE PARTITIONING", Algorithm::Copy, LockLevel::Shared, true).warnings(&[
                    "SHARED lock: DML writes blocked during operation",
                    "Table rebuild required: removing partitioning structure",
                ]),
            ),
        ),
        (
            ActionKind::CheckPartition,
            RuleSet::Fixed(
                Outcome::new("CHECK PARTITION", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Partition validation: read-only operation"]),
            ),
        ),
        (
            ActionKind::OptimizePartition,
            RuleSet::Fixed(
                Outcome::new("OPTIMIZE PARTITION", Algorithm::Copy, LockLevel::Shared, true)
                    .notes(&["Rebuilds entire table: ALGORITHM and LOCK clauses are ignored by MySQL"])
                    .warnings(&[
                        "SHARED lock: DML writes blocked during optimization",
                        "Table rebuild required: entire table is rebuilt regardless of partition scope",
                    ]),
            ),
        ),
        (
            ActionKind::RepairPartition,
            RuleSet::Fixed(
                Outcome::new("REPAIR PARTITION", Algorithm::Inplace, LockLevel::None, false)
                    .notes(&["Partition repair operation"]),
            ),
        ),
        (
            ActionKind::DiscardPartitionTablespace,
            RuleSet::Fixed(
                Outcome::new("DISCARD PARTITION TABLESPACE", Algorithm::Copy, LockLevel::Exclusive, false)
                    .notes(&[DEFAULT_ONLY])
                    .warnings(&["EXCLUSIVE lock: no concurrent read or write access during tablespace discard"]),
            ),
        ),
        (
            ActionKind::ImportPartitionTablespace,
            RuleSet::Fixed(
                Outcome::new("IMPORT PARTITION TABLESPACE", Algorithm::Copy, LockLevel::Exclusive, false)
                    .notes(&[DEFAULT_ONLY])
                    .warnings(&["EXCLUSIVE lock: no concurrent read or write access during tablespace import"]),
            ),
        ),
    ]
}
