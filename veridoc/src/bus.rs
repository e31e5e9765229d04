// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::manager::Sender;
use crate::visits::VisitRecord;

/// Sender for cross-service communication bus.
pub type ServiceSender = Sender<ServiceMessage>;

/// Messages which can be sent on the communication bus.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ServiceMessage {
    /// A public verification page was requested.
    ///
    /// Published by the HTTP service after the response has been determined and consumed by the
    /// visit logger. Delivery is best-effort, a full or missing subscriber never affects the
    /// verification response.
    PageVisited(VisitRecord),
}
