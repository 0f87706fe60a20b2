// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn uuid_ids_are_distinct() {
    let ids = UuidIdGen;
    assert_ne!(ids.next(), ids.next());
}

#[test]
fn sequential_ids_count_up_across_clones() {
    let ids = SequentialIdGen::new("comp");
    let shared = ids.clone();

    assert_eq!(ids.next(), InstanceId::from("comp-1"));
    assert_eq!(shared.next(), InstanceId::from("comp-2"));
    assert_eq!(ids.next().to_string(), "comp-3");
}
