use crate::orders::OrderStatus;

/// Service for managing order status transitions
///
/// The fulfillment path pending → confirmed → processing → shipped →
/// delivered only moves forward; skipping intermediate steps is allowed
/// (step discipline is dashboard policy, not a mechanism this engine
/// enforces). Cancellation is only reachable from
/// `pending` or `confirmed`. `refunded` is recorded from post-payment
/// states by external payment reconciliation. `cancelled` and `refunded`
/// are terminal.
pub struct StatusMachine;

impl StatusMachine {
    /// Position within the linear fulfillment path, if on it.
    fn fulfillment_rank(status: OrderStatus) -> Option<u8> {
        match status {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::Shipped => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled | OrderStatus::Refunded => None,
        }
    }

    /// Check if a status transition is valid
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        // Same status is always valid (idempotent)
        if from == to {
            return true;
        }

        match (Self::fulfillment_rank(from), to) {
            // Terminal states allow nothing
            (None, _) => false,

            // Cancellation only before fulfillment starts
            (Some(rank), OrderStatus::Cancelled) => rank <= 1,

            // Refunds only once payment can have happened
            (Some(rank), OrderStatus::Refunded) => rank >= 1,

            // Forward moves along the fulfillment path
            (Some(from_rank), to_status) => match Self::fulfillment_rank(to_status) {
                Some(to_rank) => to_rank > from_rank,
                None => false,
            },
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// Returns `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!(
                "Invalid status transition from {} to {}",
                from, to
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_steps_are_valid() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(
                StatusMachine::is_valid_transition(pair[0], pair[1]),
                "{} -> {} should be valid",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_forward_skips_are_allowed() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Processing
        ));
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Confirmed,
            OrderStatus::Delivered
        ));
    }

    #[test]
    fn test_backward_moves_are_rejected() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Confirmed,
            OrderStatus::Pending
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Shipped,
            OrderStatus::Processing
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Delivered,
            OrderStatus::Shipped
        ));
    }

    #[test]
    fn test_cancel_only_from_pending_or_confirmed() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Cancelled
        ));
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Confirmed,
            OrderStatus::Cancelled
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Processing,
            OrderStatus::Cancelled
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Shipped,
            OrderStatus::Cancelled
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Delivered,
            OrderStatus::Cancelled
        ));
    }

    #[test]
    fn test_refund_only_from_post_payment_states() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Refunded
        ));
        for from in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            assert!(
                StatusMachine::is_valid_transition(from, OrderStatus::Refunded),
                "{} -> refunded should be valid",
                from
            );
        }
    }

    #[test]
    fn test_cancelled_is_terminal() {
        for to in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Refunded,
        ] {
            assert!(!StatusMachine::is_valid_transition(OrderStatus::Cancelled, to));
        }
    }

    #[test]
    fn test_refunded_is_terminal() {
        for to in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!StatusMachine::is_valid_transition(OrderStatus::Refunded, to));
        }
    }

    #[test]
    fn test_transition_valid() {
        let result = StatusMachine::transition(OrderStatus::Pending, OrderStatus::Confirmed);
        assert_eq!(result.unwrap(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_transition_invalid() {
        let result = StatusMachine::transition(OrderStatus::Shipped, OrderStatus::Cancelled);
        assert!(result.unwrap_err().contains("Invalid status transition"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn order_status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::Pending),
            Just(OrderStatus::Confirmed),
            Just(OrderStatus::Processing),
            Just(OrderStatus::Shipped),
            Just(OrderStatus::Delivered),
            Just(OrderStatus::Cancelled),
            Just(OrderStatus::Refunded),
        ]
    }

    /// Same-status transitions are always valid (idempotent).
    #[test]
    fn prop_same_status_is_valid() {
        proptest!(|(status in order_status_strategy())| {
            prop_assert!(StatusMachine::is_valid_transition(status, status));
        });
    }

    /// Terminal states admit no outgoing transitions.
    #[test]
    fn prop_terminal_states_are_terminal() {
        proptest!(|(to in order_status_strategy())| {
            for terminal in [OrderStatus::Cancelled, OrderStatus::Refunded] {
                if to != terminal {
                    prop_assert!(!StatusMachine::is_valid_transition(terminal, to));
                }
            }
        });
    }

    /// The fulfillment path never moves backwards.
    #[test]
    fn prop_no_backward_fulfillment_moves() {
        proptest!(|(
            from in order_status_strategy(),
            to in order_status_strategy()
        )| {
            if let (Some(from_rank), Some(to_rank)) = (
                StatusMachine::fulfillment_rank(from),
                StatusMachine::fulfillment_rank(to),
            ) {
                if to_rank < from_rank {
                    prop_assert!(!StatusMachine::is_valid_transition(from, to));
                }
            }
        });
    }

    /// transition() and is_valid_transition() agree.
    #[test]
    fn prop_transition_consistency() {
        proptest!(|(
            from in order_status_strategy(),
            to in order_status_strategy()
        )| {
            let is_valid = StatusMachine::is_valid_transition(from, to);
            let result = StatusMachine::transition(from, to);
            if is_valid {
                prop_assert_eq!(result.unwrap(), to);
            } else {
                prop_assert!(result.is_err());
            }
        });
    }
}
