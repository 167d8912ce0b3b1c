pub mod reschedule;
pub mod reschedule_input;
pub mod shift;
pub mod staff;

pub use reschedule::{Priority, RequestStatus, RescheduleRequest, StateChange, SwapType};
pub use reschedule_input::{
    CreateRescheduleInput, ProposeInput, RejectInput, RescheduleMutationResponse, RespondInput,
    SweepResponse, UpdateRescheduleInput,
};
pub use shift::{Shift, ShiftStatus};
pub use staff::{Actor, StaffMember, StaffRole};
