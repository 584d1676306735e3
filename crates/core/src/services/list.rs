//! Patient list orchestrator.
//!
//! Drives page fetches for the list view: applies filter and page size
//! changes, navigates between pages, forward-fills the cursors of skipped
//! pages, and refreshes the current page after a mutation.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::{DomainError, GatewayError, ServiceError, ServiceResult};
use crate::metrics::{
    FetchTimer, record_forward_fill_fetch, record_mutation, record_navigation_stall,
    record_page_fetch_error, record_page_fetched,
};
use crate::models::PatientFilter;
use crate::ports::{Cursor, Notification, Notifier, PatientGateway, PatientPage};

use super::cursor_map::{CursorMap, CursorState};
use super::list_state::{ListState, ListView, total_pages};

/// Where a navigation request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The requested page is displayed.
    Arrived { page: u32 },
    /// Results ended before the requested page; the last reachable page is
    /// displayed instead.
    Stalled { requested: u32, reached: u32 },
}

impl NavigationOutcome {
    /// Page now on display.
    pub fn page(&self) -> u32 {
        match self {
            NavigationOutcome::Arrived { page } => *page,
            NavigationOutcome::Stalled { reached, .. } => *reached,
        }
    }
}

// =============================================================================
// PatientListService
// =============================================================================

/// List query orchestrator.
///
/// # Design
///
/// Cursors are strictly sequential: the cursor of page `N + 1` comes out of
/// the fetch of page `N`. Every operation takes the state lock for its whole
/// duration, so at most one fetch sequence is in flight and concurrent
/// callers wait for it instead of interleaving fetches.
///
/// # Flow
///
/// 1. A filter or page size change resets the cursors and loads page 1
/// 2. Each successful fetch records the cursor of the following page
/// 3. Navigating past the known cursors fetches the skipped pages in order
/// 4. After a mutation, [`refresh`](Self::refresh) reloads the current page
///    and falls back to page 1 when it no longer exists
pub struct PatientListService<G: PatientGateway> {
    gateway: Arc<G>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ListState>,
}

impl<G: PatientGateway> PatientListService<G> {
    pub fn new(gateway: Arc<G>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            state: Mutex::new(ListState::default()),
        }
    }

    /// Start with a custom page size.
    pub fn with_page_size(
        gateway: Arc<G>,
        notifier: Arc<dyn Notifier>,
        page_size: u32,
    ) -> ServiceResult<Self> {
        Ok(Self {
            gateway,
            notifier,
            state: Mutex::new(ListState::new(page_size)?),
        })
    }

    /// Snapshot of what the list currently shows.
    pub async fn view(&self) -> ListView {
        self.state.lock().await.view()
    }

    /// Snapshot of the cursor cache.
    pub async fn cursors(&self) -> CursorMap {
        self.state.lock().await.cursors().clone()
    }

    /// Load the current page (page 1 on a fresh service).
    #[instrument(skip(self))]
    pub async fn load(&self) -> ServiceResult<ListView> {
        let mut state = self.state.lock().await;
        let page = state.current_page();
        self.show_known_page(&mut state, page).await?;
        Ok(state.view())
    }

    /// Replace the filter, reset pagination and load page 1.
    #[instrument(skip(self, filter))]
    pub async fn on_filter_change(&self, filter: PatientFilter) -> ServiceResult<ListView> {
        let mut state = self.state.lock().await;
        state.set_filters(filter);
        debug!(filter = ?state.filter(), "Filter changed");
        self.show_known_page(&mut state, 1).await?;
        Ok(state.view())
    }

    /// Change the page size, reset pagination and load page 1.
    #[instrument(skip(self))]
    pub async fn on_page_size_change(&self, page_size: u32) -> ServiceResult<ListView> {
        let mut state = self.state.lock().await;
        state.set_page_size(page_size)?;
        debug!(page_size, "Page size changed");
        self.show_known_page(&mut state, 1).await?;
        Ok(state.view())
    }

    /// Navigate to `target`, fetching any skipped pages first.
    ///
    /// Resolves once `target` is displayed, or once navigation stalled at the
    /// furthest reachable page.
    #[instrument(skip(self))]
    pub async fn on_navigate(&self, target: u32) -> ServiceResult<NavigationOutcome> {
        if target == 0 {
            return Err(DomainError::InvalidPage(target).into());
        }

        let mut state = self.state.lock().await;

        if state.cursors().is_known(target) {
            self.show_known_page(&mut state, target).await?;
            return Ok(NavigationOutcome::Arrived { page: target });
        }

        let mut page = state.cursors().max_known_page();

        // End of results already known and on display: nothing to fetch.
        if state.cursors().get(page + 1) == Some(&CursorState::Unreachable)
            && state.current_page() == page
        {
            record_navigation_stall(target);
            debug!(requested = target, reached = page, "Navigation stalled");
            return Ok(NavigationOutcome::Stalled {
                requested: target,
                reached: page,
            });
        }

        debug!(from = page, to = target, "Forward-filling cursors");
        loop {
            let data = self.fetch(&mut state, page).await?;

            if page == target {
                state.show(page, data);
                return Ok(NavigationOutcome::Arrived { page });
            }
            if data.next_cursor.is_none() {
                state.show(page, data);
                record_navigation_stall(target);
                info!(requested = target, reached = page, "Results end before requested page");
                return Ok(NavigationOutcome::Stalled {
                    requested: target,
                    reached: page,
                });
            }

            record_forward_fill_fetch();
            page += 1;
        }
    }

    /// Refetch the current page after the result set changed.
    ///
    /// Once the fetch succeeds, cursors past the following page were
    /// computed against the previous result set and are dropped. A failed
    /// refresh leaves the cursors untouched. When the current page no longer
    /// exists the list falls back to page 1.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ServiceResult<ListView> {
        let mut state = self.state.lock().await;
        let page = state.current_page();

        let data = self.fetch(&mut state, page).await?;
        state.cursors_mut().truncate_after(page + 1);
        let pages = total_pages(data.total_count, state.page_size());

        if page > 1 && page > pages {
            debug!(page, total_pages = pages, "Current page out of range, back to page 1");
            state.reset();
            self.show_known_page(&mut state, 1).await?;
        } else {
            state.show(page, data);
        }

        Ok(state.view())
    }

    /// Delete a patient and refresh the list.
    #[instrument(skip(self))]
    pub async fn delete_patient(&self, id: &str) -> ServiceResult<ListView> {
        let outcome = match self.gateway.delete_patient(id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                record_mutation("delete", "error");
                warn!(error = %e, "Delete failed");
                self.notifier.notify(Notification::error(
                    "Failed to delete patient. Please try again.",
                ));
                return Err(e.into());
            }
        };

        if !outcome.success {
            record_mutation("delete", "not_found");
            self.notifier.notify(Notification::error(outcome.message.clone()));
            return Err(GatewayError::NotFound(outcome.message).into());
        }

        record_mutation("delete", "ok");
        self.notifier.notify(Notification::success(outcome.message));
        self.refresh().await
    }

    /// Fetch a page whose cursor is known and display it.
    async fn show_known_page(&self, state: &mut ListState, page: u32) -> ServiceResult<()> {
        let data = self.fetch(state, page).await?;
        state.show(page, data);
        Ok(())
    }

    /// Fetch `page` under the current filter and record the next cursor.
    ///
    /// Nothing is recorded when the fetch fails.
    async fn fetch(&self, state: &mut ListState, page: u32) -> ServiceResult<PatientPage> {
        let after: Option<Cursor> = match state.cursors().after_for(page) {
            Some(after) => after.cloned(),
            None => return Err(DomainError::InvalidPage(page).into()),
        };

        let _timer = FetchTimer::new();
        let result = self
            .gateway
            .fetch_page(state.filter(), state.page_size(), after.as_ref())
            .await;

        match result {
            Ok(data) => {
                record_page_fetched();
                debug!(
                    page,
                    records = data.records.len(),
                    total = data.total_count,
                    has_next = data.next_cursor.is_some(),
                    "Page fetched"
                );
                state.cursors_mut().record_fetch(page, data.next_cursor.clone());
                Ok(data)
            }
            Err(e) => {
                record_page_fetch_error();
                warn!(page, error = %e, "Page fetch failed");
                self.notifier.notify(Notification::error(format!(
                    "Failed to load patients: {}",
                    e
                )));
                Err(ServiceError::from(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::models::fixtures::patient;
    use crate::ports::NotificationLevel;
    use crate::services::notifications::ChannelNotifier;
    use crate::services::testing::MemoryGateway;

    fn service(
        records: usize,
        page_size: u32,
    ) -> (
        Arc<MemoryGateway>,
        PatientListService<MemoryGateway>,
        tokio::sync::mpsc::UnboundedReceiver<Notification>,
    ) {
        let gateway = Arc::new(MemoryGateway::with_records(records));
        let (notifier, rx) = ChannelNotifier::new();
        let svc =
            PatientListService::with_page_size(gateway.clone(), Arc::new(notifier), page_size)
                .unwrap();
        (gateway, svc, rx)
    }

    // Test critique: 25 enregistrements, page 1 -> 3 = exactement deux fetchs (pages 2 et 3)
    #[tokio::test]
    async fn test_jump_forward_fills_skipped_pages_in_order() {
        let (gateway, svc, _rx) = service(25, 10);
        svc.load().await.unwrap();
        gateway.clear_calls();

        let outcome = svc.on_navigate(3).await.unwrap();
        assert_eq!(outcome, NavigationOutcome::Arrived { page: 3 });

        // Page 2 part du curseur de la page 1, page 3 de celui de la page 2
        assert_eq!(gateway.calls_after(), vec![Some(9), Some(19)]);
        assert_eq!(gateway.max_in_flight.load(Ordering::SeqCst), 1);

        let view = svc.view().await;
        assert_eq!(view.current_page, 3);
        assert_eq!(view.records.len(), 5);
        assert_eq!(view.records[0].id, "patient-20");
    }

    #[tokio::test]
    async fn test_navigating_past_the_end_stalls_at_last_page() {
        let (gateway, svc, _rx) = service(25, 10);
        svc.load().await.unwrap();

        let outcome = svc.on_navigate(4).await.unwrap();
        assert_eq!(
            outcome,
            NavigationOutcome::Stalled {
                requested: 4,
                reached: 3
            }
        );
        let cursors = svc.cursors().await;
        assert_eq!(cursors.get(4), Some(&CursorState::Unreachable));
        assert_eq!(cursors.last_page(), Some(3));

        // Déjà sur la dernière page: aucun fetch supplémentaire
        gateway.clear_calls();
        let again = svc.on_navigate(7).await.unwrap();
        assert_eq!(again.page(), 3);
        assert!(gateway.calls_after().is_empty());
    }

    // Retour arrière: on réutilise le curseur connu, sans séquence de remplissage
    #[tokio::test]
    async fn test_backward_navigation_reuses_known_cursor() {
        let (gateway, svc, _rx) = service(25, 10);
        svc.load().await.unwrap();
        svc.on_navigate(3).await.unwrap();
        gateway.clear_calls();

        let outcome = svc.on_navigate(2).await.unwrap();
        assert_eq!(outcome, NavigationOutcome::Arrived { page: 2 });
        assert_eq!(gateway.calls_after(), vec![Some(9)]);
    }

    #[tokio::test]
    async fn test_filter_change_discards_cursors_until_fetch_completes() {
        let (gateway, svc, _rx) = service(25, 10);
        svc.load().await.unwrap();
        svc.on_navigate(3).await.unwrap();

        // Le fetch de la page 1 échoue: seule la page 1 doit rester connue
        gateway.fail_next.store(true, Ordering::SeqCst);
        let filter = PatientFilter {
            search: Some("patient".into()),
            ..Default::default()
        };
        assert!(svc.on_filter_change(filter.clone()).await.is_err());
        let cursors = svc.cursors().await;
        assert_eq!(cursors, CursorMap::new());

        // Puis le fetch réussit et apprend la page 2 sous le nouveau filtre
        svc.on_filter_change(filter).await.unwrap();
        let cursors = svc.cursors().await;
        assert_eq!(cursors.len(), 2);
        assert!(cursors.is_known(2));
    }

    // Test critique: un changement de filtre raté n'affiche pas l'ancienne page
    #[tokio::test]
    async fn test_failed_filter_change_clears_displayed_page() {
        let (gateway, svc, _rx) = service(25, 10);
        svc.load().await.unwrap();
        svc.on_navigate(3).await.unwrap();

        gateway.fail_next.store(true, Ordering::SeqCst);
        let filter = PatientFilter {
            search: Some("zzz-no-match".into()),
            ..Default::default()
        };
        assert!(svc.on_filter_change(filter).await.is_err());

        let view = svc.view().await;
        assert_eq!(view.current_page, 1);
        assert_eq!(view.filter.search.as_deref(), Some("zzz-no-match"));
        assert!(view.records.is_empty());
        assert_eq!(view.total_count, 0);
        assert_eq!(view.summary(), "Showing 0 to 0 of 0 patients");
    }

    #[tokio::test]
    async fn test_failed_page_size_change_clears_displayed_page() {
        let (gateway, svc, _rx) = service(25, 10);
        svc.load().await.unwrap();

        gateway.fail_next.store(true, Ordering::SeqCst);
        assert!(svc.on_page_size_change(20).await.is_err());

        let view = svc.view().await;
        assert_eq!(view.page_size, 20);
        assert!(view.records.is_empty());
        assert_eq!(view.total_pages, 0);
    }

    #[tokio::test]
    async fn test_page_size_change_never_reuses_old_cursors() {
        let (gateway, svc, _rx) = service(45, 10);
        svc.load().await.unwrap();
        svc.on_navigate(3).await.unwrap();
        gateway.clear_calls();

        let view = svc.on_page_size_change(20).await.unwrap();
        assert_eq!(view.current_page, 1);
        assert_eq!(view.records.len(), 20);
        svc.on_navigate(2).await.unwrap();

        // Page 1 repart du début, page 2 utilise le curseur calculé avec la taille 20
        assert_eq!(gateway.calls_after(), vec![None, Some(19)]);
        assert_eq!(gateway.calls_size(), vec![20, 20]);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_fill_and_keeps_learned_cursors() {
        let (gateway, svc, mut rx) = service(45, 10);
        svc.load().await.unwrap();

        // Le 2e fetch de la séquence (page 3) échoue
        gateway.fail_on_call.store(2, Ordering::SeqCst);
        gateway.clear_calls();
        let err = svc.on_navigate(4).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Network);

        let cursors = svc.cursors().await;
        assert!(cursors.is_known(3));
        assert_eq!(cursors.get(4), None);
        assert_eq!(svc.view().await.current_page, 1);

        let note = rx.try_recv().unwrap();
        assert_eq!(note.level, NotificationLevel::Error);
    }

    // Un refresh raté ne touche pas au cache de curseurs
    #[tokio::test]
    async fn test_failed_refresh_keeps_cursors() {
        let (gateway, svc, mut rx) = service(45, 10);
        svc.load().await.unwrap();
        svc.on_navigate(4).await.unwrap();
        svc.on_navigate(2).await.unwrap();
        let before = svc.cursors().await;
        assert!(before.is_known(4));

        gateway.fail_next.store(true, Ordering::SeqCst);
        assert!(svc.refresh().await.is_err());
        assert_eq!(svc.cursors().await, before);
        assert_eq!(svc.view().await.current_page, 2);
        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Error);

        // Le refresh suivant réussit et oublie les pages au-delà de la suivante
        svc.refresh().await.unwrap();
        let after = svc.cursors().await;
        assert!(after.is_known(3));
        assert!(!after.is_known(4));
    }

    // Deux navigations concurrentes ne doivent jamais entrelacer leurs fetchs
    #[tokio::test]
    async fn test_concurrent_navigations_are_serialized() {
        let (gateway, svc, _rx) = service(95, 10);
        gateway.delay_ms.store(5, Ordering::SeqCst);
        let svc = Arc::new(svc);
        svc.load().await.unwrap();

        let a = tokio::spawn({
            let svc = svc.clone();
            async move { svc.on_navigate(6).await }
        });
        let b = tokio::spawn({
            let svc = svc.clone();
            async move { svc.on_navigate(9).await }
        });
        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();

        assert_eq!(gateway.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(a.page(), 6);
        assert_eq!(b.page(), 9);
    }

    // 11 enregistrements, page 2: après suppression il ne reste qu'une page
    #[tokio::test]
    async fn test_delete_on_last_page_clamps_back_to_page_one() {
        let (gateway, svc, mut rx) = service(11, 10);
        svc.load().await.unwrap();
        svc.on_navigate(2).await.unwrap();

        let view = svc.delete_patient("patient-10").await.unwrap();
        assert_eq!(view.current_page, 1);
        assert_eq!(view.records.len(), 10);
        assert_eq!(view.total_pages, 1);

        let cursors = svc.cursors().await;
        assert!(!cursors.is_known(2));
        assert_eq!(gateway.len(), 10);

        let note = rx.try_recv().unwrap();
        assert_eq!(note, Notification::success("Patient deleted successfully"));
    }

    #[tokio::test]
    async fn test_delete_unknown_patient_reports_not_found() {
        let (_gateway, svc, mut rx) = service(3, 10);
        svc.load().await.unwrap();

        let err = svc.delete_patient("nope").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_refresh_after_insert_relearns_next_cursor() {
        let (gateway, svc, _rx) = service(10, 10);
        svc.load().await.unwrap();
        assert_eq!(svc.cursors().await.get(2), Some(&CursorState::Unreachable));

        gateway.push_front(patient("new", "New", "Patient"));
        let view = svc.refresh().await.unwrap();
        assert_eq!(view.total_count, 11);
        assert_eq!(view.records[0].id, "new");
        assert!(svc.cursors().await.is_known(2));
    }

    #[tokio::test]
    async fn test_page_zero_and_bad_sizes_are_rejected() {
        let (_gateway, svc, _rx) = service(5, 10);
        assert!(svc.on_navigate(0).await.is_err());
        let err = svc.on_page_size_change(500).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }
}
