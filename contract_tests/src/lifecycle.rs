//! Run lifecycle contract tests
//!
//! These tests define the stable contract for the two collective
//! transitions of a run: the workload-loaded rendezvous at start and the
//! destruction rendezvous at finish, including the teardown the last
//! retiring instance performs.

#[cfg(test)]
mod tests {
    use crate::test_helpers::*;
    use event_queue::{GlobalEventQueue, SharedEventQueue};
    use sched_kernel::{CoordinationContext, CoordinationEvent, KernelInstance};
    use sim_types::{KernelId, RtosEventKind, SimTime, TaskName};

    #[test]
    fn test_start_rendezvous_fires_once_when_all_loaded() {
        let mut ctx = CoordinationContext::new();
        let mut instances: Vec<KernelInstance> = ["a", "b", "c"]
            .iter()
            .map(|name| simple_instance(&mut ctx, name))
            .collect();

        instances[0].load_workload(&mut ctx, &[1.0]).unwrap();
        assert!(!ctx.all_ready());
        instances[1].load_workload(&mut ctx, &[1.0]).unwrap();
        assert!(!ctx.all_ready());
        instances[2].load_workload(&mut ctx, &[1.0]).unwrap();
        assert!(ctx.all_ready());

        // The completed round cleared itself: a later signal opens a new
        // round instead of re-triggering
        ctx.mark_ready(instances[0].id());
        assert!(!ctx.all_ready());
    }

    #[test]
    fn test_double_signal_within_a_round_is_idempotent() {
        let mut ctx = CoordinationContext::new();
        let a = simple_instance(&mut ctx, "a");
        let b = simple_instance(&mut ctx, "b");

        ctx.mark_ready(a.id());
        ctx.mark_ready(a.id());
        ctx.mark_ready(a.id());
        assert!(!ctx.all_ready());
        ctx.mark_ready(b.id());
        assert!(ctx.all_ready());
    }

    #[test]
    fn test_finish_rendezvous_tears_down_run_state() {
        let mut ctx = CoordinationContext::new();
        let a = simple_instance(&mut ctx, "a");
        let b = simple_instance(&mut ctx, "b");
        let c = simple_instance(&mut ctx, "c");
        let mut queue = GlobalEventQueue::new();

        for inst in [&a, &b, &c] {
            inst.schedule_event(
                &mut queue,
                SimTime::from_ticks(100),
                RtosEventKind::Other,
                TaskName::new("tau_1"),
            )
            .unwrap();
        }

        assert!(!a.retire(&mut ctx, &mut queue));
        assert!(!b.retire(&mut ctx, &mut queue));
        // Pending events of retired siblings stay until the last one goes
        assert_eq!(queue.len(), 3);

        assert!(c.retire(&mut ctx, &mut queue));
        assert!(queue.is_empty());
        assert_eq!(ctx.registered_count(), 0);
        assert_eq!(ctx.max_band(), 0);
    }

    #[test]
    fn test_fresh_run_restarts_band_numbering() {
        let mut ctx = CoordinationContext::new();
        let mut queue = GlobalEventQueue::new();

        let first = simple_instance(&mut ctx, "a");
        let second = simple_instance(&mut ctx, "b");
        assert_eq!(second.band().base(), ctx.band_width());

        first.retire(&mut ctx, &mut queue);
        second.retire(&mut ctx, &mut queue);

        // Not a continuation of prior numbering
        let next_run = simple_instance(&mut ctx, "z");
        assert_eq!(next_run.band().base(), 0);
    }

    #[test]
    fn test_run_id_changes_across_teardown() {
        let mut ctx = CoordinationContext::new();
        let mut queue = GlobalEventQueue::new();
        let first_run = ctx.run_id();

        let a = simple_instance(&mut ctx, "a");
        a.retire(&mut ctx, &mut queue);

        assert_ne!(ctx.run_id(), first_run);
    }

    #[test]
    fn test_recreated_id_reuses_its_band_mid_run() {
        let mut ctx = CoordinationContext::new();
        let a = simple_instance(&mut ctx, "a");
        let b = simple_instance(&mut ctx, "b");
        let a_base = a.band().base();
        drop(a);

        // Same id, same run: the band comes back, no fresh allocation
        let a_again = simple_instance(&mut ctx, "a");
        assert_eq!(a_again.band().base(), a_base);
        assert_eq!(ctx.registered_count(), 2);
        assert_eq!(b.band().base(), ctx.band_width());
    }

    #[test]
    fn test_unregistered_signal_never_completes_a_round() {
        let mut ctx = CoordinationContext::new();
        let a = simple_instance(&mut ctx, "a");

        ctx.mark_ready(&KernelId::new("ghost"));
        assert!(!ctx.all_ready());
        ctx.mark_ready(a.id());
        assert!(ctx.all_ready());
    }

    #[test]
    fn test_audit_log_traces_full_lifecycle() {
        let mut ctx = CoordinationContext::new();
        let mut queue = GlobalEventQueue::new();

        let a = simple_instance(&mut ctx, "a");
        let b = simple_instance(&mut ctx, "b");
        a.retire(&mut ctx, &mut queue);
        b.retire(&mut ctx, &mut queue);

        let log = ctx.audit_log();
        assert_eq!(
            log,
            &[
                CoordinationEvent::BandAllocated {
                    kernel: KernelId::new("a"),
                    base: 0
                },
                CoordinationEvent::BandAllocated {
                    kernel: KernelId::new("b"),
                    base: ctx.band_width()
                },
                CoordinationEvent::RoundCompleted { participants: 2 },
                CoordinationEvent::ContextReset,
            ]
        );
    }
}
