//! JSON-lines request/response protocol.
//!
//! One request object per line, tagged by `op`:
//!
//! ```text
//! {"op":"create_group","name":"Ski Trip","creator_email":"ana@example.com"}
//! {"op":"record_activity","group_id":"…","description":"Cabin","amount":"300.00","paid_by":"…"}
//! ```
//!
//! Amounts are decimal strings, parsed and range-checked as [`Money`] before
//! they reach the service. Every line gets exactly one response line,
//! either `{"status":"ok","result":…}` or `{"status":"error","code":…,"message":…}`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use splitledger_core::{GroupId, ParticipantId};
use splitledger_events::EventPublisher;
use splitledger_infra::{ExpenseGroupRepository, LedgerEnvelope, LedgerError, LedgerService};
use splitledger_ledger::Money;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    CreateGroup {
        name: String,
        creator_email: String,
    },
    AddParticipant {
        group_id: GroupId,
        email: String,
    },
    ActivateGroup {
        group_id: GroupId,
    },
    RecordActivity {
        group_id: GroupId,
        description: String,
        amount: String,
        paid_by: ParticipantId,
        #[serde(default)]
        split_with: Option<Vec<ParticipantId>>,
    },
    Settle {
        group_id: GroupId,
        from: ParticipantId,
        to: ParticipantId,
        amount: String,
    },
    GetBalances {
        group_id: GroupId,
    },
    GetGroup {
        group_id: GroupId,
    },
    ListGroups,
    ExpenseHistory {
        group_id: GroupId,
        #[serde(default)]
        page: usize,
        #[serde(default)]
        size: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { result: Value },
    Error { code: String, message: String },
}

impl Response {
    fn ok(result: impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(result) => Response::Ok { result },
            Err(err) => Response::Error {
                code: "INTERNAL_ERROR".to_string(),
                message: format!("failed to encode result: {err}"),
            },
        }
    }

    fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl From<LedgerError> for Response {
    fn from(err: LedgerError) -> Self {
        Response::error(err.code(), err.to_string())
    }
}

/// Parse one line and run it against `service`.
pub fn handle_line<R, P>(service: &LedgerService<R, P>, line: &str) -> Response
where
    R: ExpenseGroupRepository,
    P: EventPublisher<LedgerEnvelope>,
{
    match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(service, request),
        Err(err) => Response::error("VALIDATION_ERROR", format!("malformed request: {err}")),
    }
}

pub fn dispatch<R, P>(service: &LedgerService<R, P>, request: Request) -> Response
where
    R: ExpenseGroupRepository,
    P: EventPublisher<LedgerEnvelope>,
{
    let outcome = match request {
        Request::CreateGroup { name, creator_email } => service
            .create_group(&name, &creator_email)
            .map(|group_id| Response::ok(json!({ "group_id": group_id }))),
        Request::AddParticipant { group_id, email } => service
            .add_participant(group_id, &email)
            .map(|participant_id| Response::ok(json!({ "participant_id": participant_id }))),
        Request::ActivateGroup { group_id } => {
            service.activate_group(group_id).map(|()| Response::ok(json!({})))
        }
        Request::RecordActivity {
            group_id,
            description,
            amount,
            paid_by,
            split_with,
        } => parse_amount(&amount)
            .and_then(|amount| service.record_activity(group_id, &description, amount, paid_by, split_with))
            .map(|activity_id| Response::ok(json!({ "activity_id": activity_id }))),
        Request::Settle {
            group_id,
            from,
            to,
            amount,
        } => parse_amount(&amount)
            .and_then(|amount| service.settle(group_id, from, to, amount))
            .map(|()| Response::ok(json!({}))),
        Request::GetBalances { group_id } => service.get_balances(group_id).map(Response::ok),
        Request::GetGroup { group_id } => service.get_group(group_id).map(Response::ok),
        Request::ListGroups => service.list_groups().map(Response::ok),
        Request::ExpenseHistory { group_id, page, size } => {
            service.expense_history(group_id, page, size).map(Response::ok)
        }
    };
    outcome.unwrap_or_else(Response::from)
}

fn parse_amount(raw: &str) -> Result<rust_decimal::Decimal, LedgerError> {
    Ok(Money::parse(raw)?.amount())
}

#[cfg(test)]
mod tests {
    use splitledger_events::NoOpPublisher;
    use splitledger_infra::InMemoryGroupRepository;

    use super::*;

    fn service() -> LedgerService<InMemoryGroupRepository, NoOpPublisher> {
        LedgerService::new(InMemoryGroupRepository::new(), NoOpPublisher)
    }

    fn result_field(response: &Response, field: &str) -> String {
        match response {
            Response::Ok { result } => result[field].as_str().unwrap().to_string(),
            other => panic!("expected ok, got {other:?}"),
        }
    }

    #[test]
    fn parses_tagged_requests() {
        let req: Request = serde_json::from_str(
            r#"{"op":"create_group","name":"Trip","creator_email":"a@example.com"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            Request::CreateGroup {
                name: "Trip".to_string(),
                creator_email: "a@example.com".to_string()
            }
        );

        let req: Request = serde_json::from_str(r#"{"op":"list_groups"}"#).unwrap();
        assert_eq!(req, Request::ListGroups);
    }

    #[test]
    fn malformed_lines_are_validation_errors() {
        let svc = service();
        for line in ["not json", r#"{"op":"explode"}"#, r#"{"op":"get_group","group_id":"nope"}"#] {
            match handle_line(&svc, line) {
                Response::Error { code, .. } => assert_eq!(code, "VALIDATION_ERROR"),
                other => panic!("expected error for {line}, got {other:?}"),
            }
        }
    }

    #[test]
    fn full_session_over_the_protocol() {
        let svc = service();
        let created = handle_line(
            &svc,
            r#"{"op":"create_group","name":"Trip","creator_email":"a@example.com"}"#,
        );
        let group_id = result_field(&created, "group_id");

        let added = handle_line(
            &svc,
            &format!(r#"{{"op":"add_participant","group_id":"{group_id}","email":"b@example.com"}}"#),
        );
        let b = result_field(&added, "participant_id");

        let recorded = handle_line(
            &svc,
            &format!(
                r#"{{"op":"record_activity","group_id":"{group_id}","description":"Dinner","amount":"150.00","paid_by":"{b}"}}"#
            ),
        );
        assert!(matches!(recorded, Response::Ok { .. }));

        let balances = handle_line(&svc, &format!(r#"{{"op":"get_balances","group_id":"{group_id}"}}"#));
        match balances {
            Response::Ok { result } => {
                assert_eq!(result[0]["balance"], "-75.00");
                assert_eq!(result[1]["balance"], "75.00");
                assert_eq!(result[1]["email"], "b@example.com");
            }
            other => panic!("expected ok, got {other:?}"),
        }
    }

    #[test]
    fn ledger_errors_carry_their_code() {
        let svc = service();
        let group_id = svc.create_group("Trip", "a@example.com").unwrap();
        let payer = svc.get_balances(group_id).unwrap()[0].participant_id;

        let response = dispatch(
            &svc,
            Request::RecordActivity {
                group_id,
                description: "Dinner".to_string(),
                amount: "0".to_string(),
                paid_by: payer,
                split_with: None,
            },
        );
        match response {
            Response::Error { code, .. } => assert_eq!(code, "VALIDATION_ERROR"),
            other => panic!("expected error, got {other:?}"),
        }

        let response = dispatch(&svc, Request::ActivateGroup { group_id });
        assert!(matches!(response, Response::Error { ref code, .. } if code == "INVALID_STATE"));
    }

    #[test]
    fn amounts_must_be_decimal_strings_within_range() {
        let svc = service();
        let group_id = svc.create_group("Trip", "a@example.com").unwrap();
        let b = svc.add_participant(group_id, "b@example.com").unwrap();
        let a = svc.get_balances(group_id).unwrap()[0].participant_id;

        for amount in ["", "ten", "-5", "79228162514264337593543950335"] {
            let response = dispatch(
                &svc,
                Request::Settle {
                    group_id,
                    from: a,
                    to: b,
                    amount: amount.to_string(),
                },
            );
            assert!(
                matches!(response, Response::Error { ref code, .. } if code == "VALIDATION_ERROR"),
                "amount {amount:?} gave {response:?}"
            );
        }

        let line = format!(r#"{{"op":"settle","group_id":"{group_id}","from":"{a}","to":"{b}","amount":" 12.345 "}}"#);
        assert!(matches!(handle_line(&svc, &line), Response::Ok { .. }));
        assert_eq!(svc.get_balances(group_id).unwrap()[0].balance.to_string(), "12.35");
    }

    #[test]
    fn responses_serialise_with_a_status_tag() {
        let json = serde_json::to_value(Response::error("NOT_FOUND", "group x")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
