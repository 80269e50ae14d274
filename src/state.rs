use crate::{config::AppConfig, db::OrmConn, sms::SmsService};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub sms: SmsService,
    pub config: AppConfig,
}
