#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use gymshift_axum::error::{AppError, AppResult};
use gymshift_axum::models::{
    Actor, RequestStatus, RescheduleRequest, Shift, ShiftStatus, StaffMember, StaffRole,
};
use gymshift_axum::service::RescheduleService;
use gymshift_axum::store::{
    RequestFilter, RequestStore, ShiftEffect, ShiftStore, StaffDirectory,
};

#[derive(Default)]
struct Inner {
    staff: HashMap<Uuid, StaffMember>,
    shifts: HashMap<Uuid, Shift>,
    requests: HashMap<Uuid, RescheduleRequest>,
}

/// In-memory store implementing the workflow's collaborator traits.
///
/// The single mutex makes `commit_transition` the same all-or-nothing
/// unit of work the Postgres implementation gets from a transaction,
/// and the status comparison inside it provides the compare-and-swap.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    fail_reassign: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent shift effect fail, simulating a downstream
    /// outage during approval.
    pub fn set_fail_reassign(&self, fail: bool) {
        self.fail_reassign.store(fail, Ordering::SeqCst);
    }

    pub fn add_staff(&self, name: &str, role: StaffRole, branch_id: Uuid) -> StaffMember {
        let staff = StaffMember {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            role,
            branch_id,
            is_active: true,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .staff
            .insert(staff.id, staff.clone());
        staff
    }

    pub fn deactivate_staff(&self, id: Uuid) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(staff) = inner.staff.get_mut(&id) {
            staff.is_active = false;
        }
    }

    pub fn add_shift(
        &self,
        holder: &StaffMember,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Shift {
        let shift = Shift {
            id: Uuid::new_v4(),
            staff_id: Some(holder.id),
            branch_id: holder.branch_id,
            label: "floor".to_string(),
            starts_at,
            ends_at,
            status: ShiftStatus::Scheduled,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .shifts
            .insert(shift.id, shift.clone());
        shift
    }

    pub fn shift(&self, id: Uuid) -> Shift {
        self.inner
            .lock()
            .unwrap()
            .shifts
            .get(&id)
            .cloned()
            .expect("shift exists")
    }

    pub fn request(&self, id: Uuid) -> RescheduleRequest {
        self.inner
            .lock()
            .unwrap()
            .requests
            .get(&id)
            .cloned()
            .expect("request exists")
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert_request(&self, request: &RescheduleRequest) -> AppResult<()> {
        self.inner
            .lock()
            .unwrap()
            .requests
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn get_request(&self, id: Uuid) -> AppResult<Option<RescheduleRequest>> {
        Ok(self.inner.lock().unwrap().requests.get(&id).cloned())
    }

    async fn list_requests(&self, filter: &RequestFilter) -> AppResult<Vec<RescheduleRequest>> {
        let inner = self.inner.lock().unwrap();
        let mut requests: Vec<_> = inner
            .requests
            .values()
            .filter(|r| filter.statuses.is_empty() || filter.statuses.contains(&r.status))
            .filter(|r| {
                filter
                    .requester_staff_id
                    .map_or(true, |id| r.requester_staff_id == id)
            })
            .filter(|r| {
                filter
                    .target_staff_id
                    .map_or(true, |id| r.target_staff_id == Some(id))
            })
            .filter(|r| filter.branch_id.map_or(true, |id| r.branch_id == id))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn find_unresolved_for_shift(
        &self,
        shift_id: Uuid,
    ) -> AppResult<Option<RescheduleRequest>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .requests
            .values()
            .find(|r| r.original_shift_id == shift_id && !r.status.is_terminal())
            .cloned())
    }

    async fn list_lapsed(&self, now: DateTime<Utc>) -> AppResult<Vec<RescheduleRequest>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .requests
            .values()
            .filter(|r| !r.status.is_terminal() && r.expires_at < now)
            .cloned()
            .collect())
    }

    async fn commit_transition(
        &self,
        updated: &RescheduleRequest,
        expected: RequestStatus,
        effects: &[ShiftEffect],
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();

        let current = inner
            .requests
            .get(&updated.id)
            .ok_or_else(|| AppError::NotFound(format!("request {} not found", updated.id)))?;
        if current.status != expected {
            return Err(AppError::ConcurrentModification);
        }

        // Validate every effect before touching anything so a failure
        // leaves both the request and the shifts as they were.
        for effect in effects {
            let ShiftEffect::Reassign { shift_id, .. } = effect;
            if self.fail_reassign.load(Ordering::SeqCst) {
                return Err(AppError::ShiftReassignment(
                    "injected reassignment failure".to_string(),
                ));
            }
            let shift = inner.shifts.get(shift_id).ok_or_else(|| {
                AppError::ShiftReassignment(format!("shift {} is gone", shift_id))
            })?;
            if shift.status != ShiftStatus::Scheduled {
                return Err(AppError::ShiftReassignment(format!(
                    "shift {} is no longer reschedulable",
                    shift_id
                )));
            }
        }

        for effect in effects {
            let ShiftEffect::Reassign {
                shift_id,
                to_staff_id,
            } = effect;
            if let Some(shift) = inner.shifts.get_mut(shift_id) {
                shift.staff_id = Some(*to_staff_id);
            }
        }

        inner.requests.insert(updated.id, updated.clone());
        Ok(())
    }
}

#[async_trait]
impl ShiftStore for MemoryStore {
    async fn get_shift(&self, id: Uuid) -> AppResult<Option<Shift>> {
        Ok(self.inner.lock().unwrap().shifts.get(&id).cloned())
    }

    async fn shifts_for_staff(
        &self,
        staff_id: Uuid,
        status: ShiftStatus,
    ) -> AppResult<Vec<Shift>> {
        let inner = self.inner.lock().unwrap();
        let mut shifts: Vec<_> = inner
            .shifts
            .values()
            .filter(|s| s.staff_id == Some(staff_id) && s.status == status)
            .cloned()
            .collect();
        shifts.sort_by_key(|s| s.starts_at);
        Ok(shifts)
    }
}

#[async_trait]
impl StaffDirectory for MemoryStore {
    async fn get_staff(&self, id: Uuid) -> AppResult<Option<StaffMember>> {
        Ok(self.inner.lock().unwrap().staff.get(&id).cloned())
    }
}

pub fn service(store: &MemoryStore) -> RescheduleService<MemoryStore> {
    RescheduleService::new(store.clone(), Duration::hours(72))
}

/// Service with a custom request lifetime; a negative duration creates
/// requests that are born already past their deadline.
pub fn service_with_ttl(
    store: &MemoryStore,
    ttl: Duration,
) -> RescheduleService<MemoryStore> {
    RescheduleService::new(store.clone(), ttl)
}

pub fn actor(staff: &StaffMember) -> Actor {
    Actor {
        staff_id: staff.id,
        role: staff.role,
    }
}

/// A start time safely in the future: tomorrow plus `hour` hours.
pub fn tomorrow_at(hour: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(1) + Duration::hours(hour)
}
