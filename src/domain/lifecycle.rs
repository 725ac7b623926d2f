//! Contract lifecycle rules
//!
//! A contract holds its room only while it is `Active`. Every transition
//! resolves to one of the outcomes below; the service layer applies the room
//! side effects inside the same transaction as the contract write.

use crate::models::enums::{ContractStatus, RoomStatus};

/// What a requested status change means for the contract and its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same terminal status requested again; only `updated_at` is refreshed.
    Unchanged,
    /// Pending -> Active; the room must be claimed (Available -> Occupied).
    Activate,
    /// Active -> Completed | Cancelled; the room is released.
    Release(ContractStatus),
    /// Pending -> Completed | Cancelled; no room side effect.
    Close(ContractStatus),
}

/// Resolves `from -> to`, or explains why the change is illegal.
pub fn plan_transition(from: ContractStatus, to: ContractStatus) -> Result<Transition, String> {
    use ContractStatus::*;

    match (from, to) {
        (Completed, Completed) | (Cancelled, Cancelled) => Ok(Transition::Unchanged),
        (Pending, Active) => Ok(Transition::Activate),
        (Active, Completed) | (Active, Cancelled) => Ok(Transition::Release(to)),
        (Pending, Cancelled) | (Pending, Completed) => Ok(Transition::Close(to)),
        (Pending, Pending) | (Active, Active) => Ok(Transition::Unchanged),
        (Completed, _) | (Cancelled, _) => Err(format!(
            "Contract is already {} and cannot become {}",
            label(from),
            label(to)
        )),
        (Active, Pending) => Err("An active contract cannot return to pending".to_string()),
    }
}

/// Whether a room in `status` may be leased by a new active contract.
pub fn can_lease(status: RoomStatus) -> bool {
    status == RoomStatus::Available
}

/// Room status after its active contract ends, given how many other active
/// contracts still reference it. Maintenance and Available are left alone.
pub fn status_after_release(current: RoomStatus, other_active: u64) -> RoomStatus {
    match current {
        RoomStatus::Occupied if other_active == 0 => RoomStatus::Available,
        other => other,
    }
}

/// Manual room status edits may only toggle Available <-> Maintenance.
pub fn check_manual_room_status(current: RoomStatus, requested: RoomStatus) -> Result<(), String> {
    if current == requested {
        return Ok(());
    }
    if current == RoomStatus::Occupied || requested == RoomStatus::Occupied {
        return Err("Room occupancy is managed by contracts".to_string());
    }
    Ok(())
}

fn label(status: ContractStatus) -> &'static str {
    match status {
        ContractStatus::Pending => "Pending",
        ContractStatus::Active => "Active",
        ContractStatus::Completed => "Completed",
        ContractStatus::Cancelled => "Cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ContractStatus::*;

    #[test]
    fn completing_active_contract_releases_room() {
        assert_eq!(
            plan_transition(Active, Completed),
            Ok(Transition::Release(Completed))
        );
        assert_eq!(
            plan_transition(Active, Cancelled),
            Ok(Transition::Release(Cancelled))
        );
    }

    #[test]
    fn repeated_terminal_status_is_a_no_op() {
        assert_eq!(plan_transition(Completed, Completed), Ok(Transition::Unchanged));
        assert_eq!(plan_transition(Cancelled, Cancelled), Ok(Transition::Unchanged));
    }

    #[test]
    fn terminal_states_do_not_reopen() {
        for to in [Pending, Active, Cancelled] {
            assert!(plan_transition(Completed, to).is_err());
        }
        for to in [Pending, Active, Completed] {
            assert!(plan_transition(Cancelled, to).is_err());
        }
    }

    #[test]
    fn pending_contract_paths() {
        assert_eq!(plan_transition(Pending, Active), Ok(Transition::Activate));
        assert_eq!(
            plan_transition(Pending, Cancelled),
            Ok(Transition::Close(Cancelled))
        );
        assert_eq!(
            plan_transition(Pending, Completed),
            Ok(Transition::Close(Completed))
        );
        assert!(plan_transition(Active, Pending).is_err());
    }

    #[test]
    fn release_keeps_maintenance_and_shared_rooms() {
        assert_eq!(
            status_after_release(RoomStatus::Occupied, 0),
            RoomStatus::Available
        );
        assert_eq!(
            status_after_release(RoomStatus::Occupied, 1),
            RoomStatus::Occupied
        );
        assert_eq!(
            status_after_release(RoomStatus::Maintenance, 0),
            RoomStatus::Maintenance
        );
    }

    #[test]
    fn only_available_rooms_can_be_leased() {
        assert!(can_lease(RoomStatus::Available));
        assert!(!can_lease(RoomStatus::Occupied));
        assert!(!can_lease(RoomStatus::Maintenance));
    }

    #[test]
    fn manual_room_status_guard() {
        assert!(check_manual_room_status(RoomStatus::Available, RoomStatus::Maintenance).is_ok());
        assert!(check_manual_room_status(RoomStatus::Maintenance, RoomStatus::Available).is_ok());
        assert!(check_manual_room_status(RoomStatus::Occupied, RoomStatus::Occupied).is_ok());
        assert!(check_manual_room_status(RoomStatus::Available, RoomStatus::Occupied).is_err());
        assert!(check_manual_room_status(RoomStatus::Occupied, RoomStatus::Available).is_err());
    }
}
