// ============================================================================
// Tenancy Core - Tenant Context
// File: crates/tenancy-core/src/context.rs
// Description: Execution-unit-local storage of the active tenant
// ============================================================================
//! Execution-unit-local storage of the active tenant.
//!
//! Two kinds of execution unit hold a slot:
//!
//! * **Async tasks.** [`TenantContext::scope`] and [`TenantContext::run`]
//!   attach a slot to a future through a tokio task-local. The slot travels
//!   with the future across worker threads and is dropped together with it,
//!   whether it completes, returns an error, panics or is cancelled.
//! * **Threads.** Outside any task scope, a thread-local slot is used.
//!   [`TenantContext::enter`] returns a [`TenantGuard`] that clears it on drop.
//!   The value is keyed by the tokio task id current at install time, so a
//!   value installed by one task (or by the thread itself) is invisible to
//!   any other task polled on the same thread.
//!
//! Inside a tokio task that has no task scope, [`TenantContext::set_current_tenant`]
//! is refused with a warning: the task may migrate between worker threads, so
//! a thread slot would not follow it. Use [`TenantContext::run`] there.
//!
//! Every slot owns a `tenant` tracing span carrying a `tenant_id` field, so
//! log output produced while a tenant is installed is tagged with it.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::Id as TaskId;
use tracing::{debug, warn, Span};

use crate::domain::TenantId;
use crate::error::DomainError;

struct TaskSlot {
    tenant: Option<TenantId>,
    span: Span,
    /// Span that was current when the scope was opened. Tenant spans hang
    /// off it so an overwrite does not nest the new span under the old one.
    parent: Span,
}

impl TaskSlot {
    fn empty(parent: Span) -> Self {
        Self {
            tenant: None,
            span: Span::none(),
            parent,
        }
    }
}

#[derive(Default)]
struct ThreadSlot {
    tenant: Option<TenantId>,
    /// Task that installed the value; `None` for plain threads.
    owner: Option<TaskId>,
    entered: Option<tracing::span::EnteredSpan>,
}

impl ThreadSlot {
    fn owned_by_caller(&self) -> bool {
        self.owner == tokio::task::try_id()
    }
}

tokio::task_local! {
    static TASK_SLOT: RefCell<TaskSlot>;
}

thread_local! {
    static THREAD_SLOT: RefCell<ThreadSlot> = RefCell::new(ThreadSlot::default());
}

fn tenant_span(tenant: &TenantId, parent: &Span) -> Span {
    tracing::info_span!(parent: parent, "tenant", tenant_id = %tenant)
}

/// Accessor for the tenant of the calling execution unit.
///
/// All operations are infallible. Set, get and clear act on the innermost
/// slot: the task slot when called inside [`TenantContext::scope`] or
/// [`TenantContext::run`], the thread slot otherwise.
pub struct TenantContext;

impl TenantContext {
    /// Installs `tenant` for the calling execution unit, replacing any
    /// previous value.
    ///
    /// Inside a task scope the new `tenant` span is entered from the next
    /// poll of the scoped future on; on a thread it is entered immediately.
    ///
    /// Ignored, with a warning, inside a tokio task that has no task scope.
    pub fn set_current_tenant(tenant: TenantId) {
        if Self::in_task_scope() {
            Self::set_in_task(tenant);
        } else if let Some(task) = tokio::task::try_id() {
            warn!(
                tenant_id = %tenant,
                task_id = %task,
                "set_current_tenant ignored: tokio task has no tenant scope, use TenantContext::run"
            );
        } else {
            Self::set_on_thread(tenant);
        }
    }

    fn set_in_task(tenant: TenantId) {
        debug!(tenant_id = %tenant, "tenant context installed");
        TASK_SLOT.with(|slot| {
            let mut slot = slot.borrow_mut();
            slot.span = tenant_span(&tenant, &slot.parent);
            slot.tenant = Some(tenant);
        });
    }

    fn set_on_thread(tenant: TenantId) {
        debug!(tenant_id = %tenant, "tenant context installed");
        THREAD_SLOT.with(|slot| {
            let mut slot = slot.borrow_mut();
            // exit the previous span before opening the next one
            slot.entered = None;
            slot.entered = Some(tenant_span(&tenant, &Span::current()).entered());
            slot.owner = tokio::task::try_id();
            slot.tenant = Some(tenant);
        });
    }

    /// The tenant of the calling execution unit, if any.
    pub fn current_tenant() -> Option<TenantId> {
        TASK_SLOT
            .try_with(|slot| slot.borrow().tenant.clone())
            .unwrap_or_else(|_| {
                THREAD_SLOT.with(|slot| {
                    let slot = slot.borrow();
                    if slot.owned_by_caller() {
                        slot.tenant.clone()
                    } else {
                        None
                    }
                })
            })
    }

    /// Removes the tenant of the calling execution unit and its log span.
    pub fn clear() {
        if Self::in_task_scope() {
            TASK_SLOT.with(|slot| {
                let mut slot = slot.borrow_mut();
                slot.tenant = None;
                slot.span = Span::none();
            });
        } else {
            THREAD_SLOT.with(|slot| {
                let mut slot = slot.borrow_mut();
                // another unit's value on this thread is not ours to clear
                if slot.owned_by_caller() {
                    slot.tenant = None;
                    slot.owner = None;
                    slot.entered = None;
                }
            });
        }
        debug!("tenant context cleared");
    }

    /// Like [`current_tenant`](Self::current_tenant), but fails when no
    /// tenant is installed. Tenant-scoped data access goes through this.
    pub fn require() -> Result<TenantId, DomainError> {
        Self::current_tenant().ok_or(DomainError::TenantContextMissing)
    }

    /// True when the caller runs inside [`scope`](Self::scope) or
    /// [`run`](Self::run).
    pub fn in_task_scope() -> bool {
        TASK_SLOT.try_with(|_| ()).is_ok()
    }

    /// Runs `fut` with a fresh, empty task slot.
    ///
    /// Nested scopes shadow the outer one; the inner scope starts empty.
    pub async fn scope<F: Future>(fut: F) -> F::Output {
        let slot = RefCell::new(TaskSlot::empty(Span::current()));
        TASK_SLOT.scope(slot, Mirrored::new(fut)).await
    }

    /// Runs `fut` with `tenant` installed for its whole lifetime.
    ///
    /// The slot is released when `fut` finishes or is dropped, so nothing
    /// carries over to whatever the runtime polls next on the same thread.
    pub async fn run<F: Future>(tenant: TenantId, fut: F) -> F::Output {
        let parent = Span::current();
        let slot = RefCell::new(TaskSlot {
            span: tenant_span(&tenant, &parent),
            tenant: Some(tenant),
            parent,
        });
        TASK_SLOT.scope(slot, Mirrored::new(fut)).await
    }

    /// Captures the caller's tenant for a future that will run elsewhere,
    /// typically one passed to `tokio::spawn`, which does not inherit
    /// task-locals.
    pub fn propagate<F: Future>(fut: F) -> impl Future<Output = F::Output> {
        let tenant = Self::current_tenant();
        async move {
            match tenant {
                Some(tenant) => Self::run(tenant, fut).await,
                None => Self::scope(fut).await,
            }
        }
    }

    /// Installs `tenant` on the current thread until the guard is dropped.
    ///
    /// For blocking workers and plain threads, including `spawn_blocking`
    /// closures. Inside a task scope it sets the task slot instead. The
    /// guard is `!Send` so it cannot be held across an `.await` in a
    /// spawned task.
    #[must_use = "the tenant is cleared as soon as the guard is dropped"]
    pub fn enter(tenant: TenantId) -> TenantGuard {
        if Self::in_task_scope() {
            Self::set_in_task(tenant);
        } else {
            Self::set_on_thread(tenant);
        }
        TenantGuard {
            _not_send: PhantomData,
        }
    }
}

/// Clears the tenant context on drop, including during unwinding.
pub struct TenantGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for TenantGuard {
    fn drop(&mut self) {
        TenantContext::clear();
    }
}

/// Enters the slot's tenant span around every poll of the inner future.
struct Mirrored<F> {
    inner: Pin<Box<F>>,
}

impl<F> Mirrored<F> {
    fn new(inner: F) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }
}

impl<F: Future> Future for Mirrored<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let span = TASK_SLOT.with(|slot| slot.borrow().span.clone());
        let _entered = span.enter();
        self.inner.as_mut().poll(cx)
    }
}
