use super::{non_blank, Tracker};
use crate::error::{Error, Result};
use crate::models::{
    CreateRequestInput, FeedbackRequest, RequestId, RequestStatus, RequestView,
    UpdateRequestStatusInput, User,
};
use crate::notify::templates;

impl Tracker {
    /// Ask the actor's manager for feedback. At most one request per
    /// employee and manager may be pending at a time.
    pub fn create_request(&self, actor: &User, input: CreateRequestInput) -> Result<RequestView> {
        if !actor.is_employee() {
            return Err(Error::forbidden("Only employees can request feedback"));
        }
        let manager_id = actor
            .manager_id
            .ok_or_else(|| Error::validation("No manager assigned"))?;
        let message = non_blank(input.message.as_deref());

        let request = self.db.transaction(|conn| {
            if FeedbackRequest::find_pending(conn, actor.id, manager_id)?.is_some() {
                return Err(Error::conflict(
                    "You already have a pending feedback request",
                ));
            }
            FeedbackRequest::insert(conn, actor.id, manager_id, message, Self::now())
        })?;

        tracing::info!(
            request_id = request.id,
            employee_id = actor.id,
            manager_id,
            "Feedback request created"
        );

        match self.directory.resolve(manager_id) {
            Some(manager) => self.send(templates::request_created(
                &self.app_url,
                actor,
                &manager,
                request.message.as_deref(),
            )),
            None => tracing::warn!(manager_id, "Skipping request notification for unknown manager"),
        }

        Ok(self.request_view(request))
    }

    /// Requests addressed to a manager, or raised by an employee; newest first.
    pub fn list_requests(&self, actor: &User) -> Result<Vec<RequestView>> {
        let requests = self.db.with_connection(|conn| {
            if actor.is_manager() {
                FeedbackRequest::list_by_manager(conn, actor.id)
            } else {
                FeedbackRequest::list_by_employee(conn, actor.id)
            }
        })?;
        Ok(requests.into_iter().map(|r| self.request_view(r)).collect())
    }

    /// Resolve a pending request as completed or declined. Resolved requests
    /// are final.
    pub fn update_request_status(
        &self,
        actor: &User,
        request_id: RequestId,
        input: UpdateRequestStatusInput,
    ) -> Result<RequestView> {
        let request = self.db.transaction(|conn| {
            let mut request = FeedbackRequest::find_by_id(conn, request_id)?
                .ok_or_else(|| Error::not_found("Feedback request not found"))?;
            if !actor.is_manager() || request.manager_id != actor.id {
                return Err(Error::forbidden("Access denied"));
            }

            let status = input
                .status
                .as_deref()
                .map(str::trim)
                .and_then(RequestStatus::from_str)
                .filter(RequestStatus::is_terminal)
                .ok_or_else(|| Error::validation("Status must be completed or declined"))?;

            if request.status.is_terminal() {
                return Err(Error::conflict(format!(
                    "Feedback request is already {}",
                    request.status.as_str()
                )));
            }

            request.status = status;
            if status == RequestStatus::Completed {
                request.completed_at = Some(Self::now());
            }
            request.save(conn)?;
            Ok(request)
        })?;

        tracing::info!(
            request_id,
            manager_id = actor.id,
            status = request.status.as_str(),
            "Feedback request resolved"
        );

        match self.directory.resolve(request.employee_id) {
            Some(employee) => {
                let notification = match request.status {
                    RequestStatus::Completed => {
                        templates::request_completed(&self.app_url, actor, &employee)
                    }
                    _ => templates::request_declined(actor, &employee),
                };
                self.send(notification);
            }
            None => tracing::warn!(
                employee_id = request.employee_id,
                "Skipping status notification for unknown employee"
            ),
        }

        Ok(self.request_view(request))
    }

    fn request_view(&self, request: FeedbackRequest) -> RequestView {
        RequestView {
            employee_name: self.display_name(request.employee_id),
            manager_name: self.display_name(request.manager_id),
            request,
        }
    }
}
