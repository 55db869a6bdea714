//! Tests for the hold/resume state machine

mod test_utils;

use chrono::{Duration, NaiveDateTime};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use slawatch::data::{Priority, Ticket};
use slawatch::sla::{as_hours, HoldCommand, HoldOutcome, SlaEngine};
use test_utils::*;

fn hold(engine: &SlaEngine, ticket: &Ticket, at: NaiveDateTime) -> Ticket {
    match engine.apply_hold(ticket, HoldCommand::PlaceOnHold { at }) {
        HoldOutcome::Held(held) => held,
        other => panic!("expected Held, got {:?}", other),
    }
}

fn resume(engine: &SlaEngine, ticket: &Ticket, at: NaiveDateTime) -> (Ticket, Duration) {
    match engine.apply_hold(ticket, HoldCommand::Resume { at }) {
        HoldOutcome::Resumed { ticket, debt } => (ticket, debt),
        other => panic!("expected Resumed, got {:?}", other),
    }
}

mod transitions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hold_records_start_and_keeps_deadline() {
        let engine = engine();
        let ticket = make_ticket("1", "INC-1", Priority::P1, jan(1, 12, 0));
        let held = hold(&engine, &ticket, jan(1, 14, 0));
        assert!(held.is_on_hold);
        assert_eq!(held.hold_start, Some(jan(1, 14, 0)));
        assert_eq!(held.adjusted_sla_end_time, ticket.adjusted_sla_end_time);
        assert_eq!(held.sla_end_time, ticket.sla_end_time);
    }

    #[test]
    fn resume_extends_by_working_time_held() {
        let engine = engine();
        let ticket = make_ticket("1", "INC-1", Priority::P1, jan(1, 12, 0));
        let held = hold(&engine, &ticket, jan(1, 14, 0));
        let (resumed, debt) = resume(&engine, &held, jan(1, 17, 0));

        assert_eq!(debt, Duration::hours(3));
        assert!(!resumed.is_on_hold);
        assert_eq!(resumed.hold_start, None);
        assert_eq!(resumed.sla_end_time, jan(1, 20, 0));
        // Raw addition, not re-projected onto the calendar
        assert_eq!(resumed.adjusted_sla_end_time, jan(1, 23, 0));
    }

    #[test]
    fn weekend_hold_costs_nothing() {
        let engine = engine();
        let ticket = make_ticket("1", "INC-3", Priority::P3, jan(5, 12, 0));
        let held = hold(&engine, &ticket, jan(5, 21, 30));
        let (resumed, debt) = resume(&engine, &held, jan(8, 11, 30));
        assert_eq!(debt, Duration::zero());
        assert_eq!(resumed.adjusted_sla_end_time, ticket.adjusted_sla_end_time);
    }

    #[test]
    fn hold_across_weekend_counts_only_working_portion() {
        let engine = engine();
        let ticket = make_ticket("1", "INC-3", Priority::P3, jan(5, 12, 0));
        let held = hold(&engine, &ticket, jan(5, 20, 0));
        let (_, debt) = resume(&engine, &held, jan(8, 12, 0));
        assert_eq!(as_hours(debt), 2.0);
    }

    #[test]
    fn double_hold_is_unchanged() {
        let engine = engine();
        let ticket = make_ticket("1", "INC-1", Priority::P1, jan(1, 12, 0));
        let held = hold(&engine, &ticket, jan(1, 14, 0));
        assert_eq!(
            engine.apply_hold(&held, HoldCommand::PlaceOnHold { at: jan(1, 15, 0) }),
            HoldOutcome::Unchanged
        );
    }

    #[test]
    fn resume_without_hold_is_unchanged() {
        let engine = engine();
        let ticket = make_ticket("1", "INC-1", Priority::P1, jan(1, 12, 0));
        assert_eq!(
            engine.apply_hold(&ticket, HoldCommand::Resume { at: jan(1, 15, 0) }),
            HoldOutcome::Unchanged
        );

        // Held flag without a recorded start
        let mut broken = ticket.clone();
        broken.is_on_hold = true;
        assert_eq!(
            engine.apply_hold(&broken, HoldCommand::Resume { at: jan(1, 15, 0) }),
            HoldOutcome::Unchanged
        );
    }

    #[test]
    fn toggle_picks_command_from_state() {
        let engine = engine();
        let ticket = make_ticket("1", "INC-1", Priority::P1, jan(1, 12, 0));
        let at = jan(1, 13, 0);
        assert_eq!(HoldCommand::toggle(&ticket, at), HoldCommand::PlaceOnHold { at });
        let held = hold(&engine, &ticket, at);
        assert_eq!(HoldCommand::toggle(&held, at), HoldCommand::Resume { at });
    }
}

mod composition {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn two_cycles_accumulate() {
        let engine = engine();
        let ticket = make_ticket("1", "INC-2", Priority::P2, jan(1, 12, 0));

        let held = hold(&engine, &ticket, jan(1, 13, 0));
        let (once, d1) = resume(&engine, &held, jan(1, 14, 0));
        let held = hold(&engine, &once, jan(2, 12, 0));
        let (twice, d2) = resume(&engine, &held, jan(2, 14, 30));

        assert_eq!(d1 + d2, Duration::minutes(210));
        assert_eq!(
            twice.adjusted_sla_end_time,
            ticket.adjusted_sla_end_time + Duration::minutes(210)
        );
    }

    proptest! {
        #[test]
        fn back_to_back_cycles_equal_one_long_hold(
            start in 0i64..7 * 24 * 60,
            first in 0i64..3 * 24 * 60,
            second in 0i64..3 * 24 * 60,
        ) {
            let engine = engine();
            let ticket = make_ticket("1", "INC-1", Priority::P1, jan(1, 12, 0));
            let t0 = jan(1, 12, 0) + Duration::minutes(start);
            let t1 = t0 + Duration::minutes(first);
            let t2 = t1 + Duration::minutes(second);

            let (split, _) = resume(&engine, &hold(&engine, &ticket, t0), t1);
            let (split, _) = resume(&engine, &hold(&engine, &split, t1), t2);
            let (single, _) = resume(&engine, &hold(&engine, &ticket, t0), t2);

            prop_assert_eq!(split.adjusted_sla_end_time, single.adjusted_sla_end_time);
            prop_assert!(single.adjusted_sla_end_time >= ticket.adjusted_sla_end_time);
        }
    }
}
