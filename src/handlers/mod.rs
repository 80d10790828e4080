use crate::{
    auth::AuthService,
    db::DbPool,
    events::EventSender,
    notifications::Notifier,
    services::{
        analytics::DashboardService, import::BulkImportService, materials::MaterialService,
        price_history::PriceHistoryService, requests::PriceChangeRequestService,
    },
};
use std::sync::Arc;

pub mod dashboard;
pub mod history;
pub mod imports;
pub mod materials;
pub mod requests;
pub mod users;

/// Aggregated domain services used by the HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub materials: Arc<MaterialService>,
    pub history: Arc<PriceHistoryService>,
    pub requests: Arc<PriceChangeRequestService>,
    pub imports: Arc<BulkImportService>,
    pub dashboard: Arc<DashboardService>,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        notifier: Arc<dyn Notifier>,
        auth: Arc<AuthService>,
    ) -> Self {
        let materials = Arc::new(MaterialService::new(
            db.clone(),
            event_sender.clone(),
            notifier.clone(),
        ));
        let history = Arc::new(PriceHistoryService::new(db.clone()));
        let requests = Arc::new(PriceChangeRequestService::new(
            db.clone(),
            event_sender,
            notifier,
            materials.clone(),
        ));
        let imports = Arc::new(BulkImportService::new(db.clone(), materials.clone()));
        let dashboard = Arc::new(DashboardService::new(db));

        Self {
            materials,
            history,
            requests,
            imports,
            dashboard,
            auth,
        }
    }
}
