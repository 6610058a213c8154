//! Request handlers. Each one parses its parameters, then hands a closure to
//! [`ApiState::run`].

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use procura_store::ProcurementStore;
use procura_types::{BidId, BidStatus, Decision, TenderId, TenderStatus};

use crate::dto::{
    many, BidResponse, CreateBidRequest, CreateTenderRequest, FeedbackResponse, PatchBidRequest,
    PatchTenderRequest, TenderResponse,
};
use crate::params::{parse_id, parse_version, JsonBody, QueryParams};
use crate::{ApiState, RpcError};

type ApiResult<T> = Result<Json<T>, RpcError>;

pub async fn ping() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "ok")
}

pub async fn metrics<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
) -> Result<impl IntoResponse, RpcError> {
    let text = match &state.metrics {
        Some(m) => m.encode()?,
        None => String::new(),
    };
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text))
}

// ── Tenders ──────────────────────────────────────────────────────────────

pub async fn list_tenders<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    query: QueryParams,
) -> ApiResult<Vec<TenderResponse>> {
    let page = query.pagination()?;
    let service_types = query.service_types()?;
    let tenders = state
        .run("list_tenders", move |svc, dl| {
            svc.tenders(dl).list_published(service_types, page)
        })
        .await?;
    Ok(Json(many(tenders)))
}

pub async fn my_tenders<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    query: QueryParams,
) -> ApiResult<Vec<TenderResponse>> {
    let page = query.pagination()?;
    let username = query.optional("username");
    let tenders = state
        .run("my_tenders", move |svc, dl| svc.tenders(dl).list_mine(&username, page))
        .await?;
    Ok(Json(many(tenders)))
}

pub async fn create_tender<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    JsonBody(body): JsonBody<CreateTenderRequest>,
) -> ApiResult<TenderResponse> {
    let (username, new) = body.into_new()?;
    let tender = state
        .run("create_tender", move |svc, dl| svc.tenders(dl).create(&username, new))
        .await?;
    Ok(Json(tender.into()))
}

pub async fn tender_status<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
    query: QueryParams,
) -> ApiResult<TenderStatus> {
    let id: TenderId = parse_id(&id, "tenderId")?;
    let username = query.optional("username");
    let status = state
        .run("tender_status", move |svc, dl| svc.tenders(dl).status(&username, &id))
        .await?;
    Ok(Json(status))
}

pub async fn update_tender_status<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
    query: QueryParams,
) -> ApiResult<TenderResponse> {
    let id: TenderId = parse_id(&id, "tenderId")?;
    let status = query.one_of("status", &TenderStatus::ALL)?;
    let username = query.required("username")?;
    let tender = state
        .run("update_tender_status", move |svc, dl| {
            svc.tenders(dl).set_status(&username, &id, status)
        })
        .await?;
    Ok(Json(tender.into()))
}

pub async fn edit_tender<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
    query: QueryParams,
    JsonBody(body): JsonBody<PatchTenderRequest>,
) -> ApiResult<TenderResponse> {
    let id: TenderId = parse_id(&id, "tenderId")?;
    let username = query.required("username")?;
    let patch = body.into_patch()?;
    let tender = state
        .run("edit_tender", move |svc, dl| svc.tenders(dl).patch(&username, &id, &patch))
        .await?;
    Ok(Json(tender.into()))
}

pub async fn rollback_tender<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path((id, version)): Path<(String, String)>,
    query: QueryParams,
) -> ApiResult<TenderResponse> {
    let id: TenderId = parse_id(&id, "tenderId")?;
    let username = query.required("username")?;
    let version = parse_version(&version)?;
    let tender = state
        .run("rollback_tender", move |svc, dl| {
            svc.rollback(dl).rollback_tender(&username, &id, version)
        })
        .await?;
    Ok(Json(tender.into()))
}

// ── Bids ─────────────────────────────────────────────────────────────────

pub async fn create_bid<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    JsonBody(body): JsonBody<CreateBidRequest>,
) -> ApiResult<BidResponse> {
    let new = body.into_new()?;
    let bid = state
        .run("create_bid", move |svc, dl| svc.bids(dl).create(new))
        .await?;
    Ok(Json(bid.into()))
}

pub async fn my_bids<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    query: QueryParams,
) -> ApiResult<Vec<BidResponse>> {
    let page = query.pagination()?;
    let username = query.optional("username");
    let bids = state
        .run("my_bids", move |svc, dl| svc.bids(dl).list_mine(&username, page))
        .await?;
    Ok(Json(many(bids)))
}

pub async fn tender_bids<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(tender_id): Path<String>,
    query: QueryParams,
) -> ApiResult<Vec<BidResponse>> {
    let tender_id: TenderId = parse_id(&tender_id, "tenderId")?;
    let username = query.required("username")?;
    let page = query.pagination()?;
    let bids = state
        .run("tender_bids", move |svc, dl| {
            svc.bids(dl).list_for_tender(&username, &tender_id, page)
        })
        .await?;
    Ok(Json(many(bids)))
}

pub async fn bid_status<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
    query: QueryParams,
) -> ApiResult<BidStatus> {
    let id: BidId = parse_id(&id, "bidId")?;
    let username = query.required("username")?;
    let status = state
        .run("bid_status", move |svc, dl| svc.bids(dl).status(&username, &id))
        .await?;
    Ok(Json(status))
}

pub async fn update_bid_status<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
    query: QueryParams,
) -> ApiResult<BidResponse> {
    let id: BidId = parse_id(&id, "bidId")?;
    let username = query.required("username")?;
    let status = query.one_of(
        "status",
        &[BidStatus::Created, BidStatus::Published, BidStatus::Canceled],
    )?;
    let bid = state
        .run("update_bid_status", move |svc, dl| {
            svc.bids(dl).update_status(&username, &id, status)
        })
        .await?;
    Ok(Json(bid.into()))
}

pub async fn edit_bid<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
    query: QueryParams,
    JsonBody(body): JsonBody<PatchBidRequest>,
) -> ApiResult<BidResponse> {
    let id: BidId = parse_id(&id, "bidId")?;
    let username = query.required("username")?;
    let patch = body.into_patch();
    let bid = state
        .run("edit_bid", move |svc, dl| svc.bids(dl).patch(&username, &id, &patch))
        .await?;
    Ok(Json(bid.into()))
}

pub async fn submit_decision<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
    query: QueryParams,
) -> ApiResult<BidResponse> {
    let id: BidId = parse_id(&id, "bidId")?;
    let username = query.required("username")?;
    let decision = query.one_of("decision", &[Decision::Approved, Decision::Rejected])?;
    let outcome = state
        .run("submit_decision", move |svc, dl| {
            svc.quorum(dl).submit_decision(&username, &id, decision)
        })
        .await?;
    Ok(Json(outcome.bid.into()))
}

pub async fn feedback_bid<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
    query: QueryParams,
) -> ApiResult<BidResponse> {
    let id: BidId = parse_id(&id, "bidId")?;
    let username = query.required("username")?;
    let text = query.required("bidFeedback")?;
    let bid = state
        .run("feedback_bid", move |svc, dl| {
            svc.feedback(dl).feedback_bid(&username, &id, &text)
        })
        .await?;
    Ok(Json(bid.into()))
}

pub async fn rollback_bid<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path((id, version)): Path<(String, String)>,
    query: QueryParams,
) -> ApiResult<BidResponse> {
    let id: BidId = parse_id(&id, "bidId")?;
    let version = parse_version(&version)?;
    let username = query.required("username")?;
    let bid = state
        .run("rollback_bid", move |svc, dl| {
            svc.rollback(dl).rollback_bid(&username, &id, version)
        })
        .await?;
    Ok(Json(bid.into()))
}

pub async fn reviews<S: ProcurementStore + 'static>(
    State(state): State<ApiState<S>>,
    Path(tender_id): Path<String>,
    query: QueryParams,
) -> ApiResult<Vec<FeedbackResponse>> {
    let tender_id: TenderId = parse_id(&tender_id, "tenderId")?;
    let author = query.required("authorUsername")?;
    let requester = query.required("requesterUsername")?;
    let page = query.pagination()?;
    let feedback = state
        .run("reviews", move |svc, dl| {
            svc.feedback(dl)
                .list_feedback(&tender_id, &author, &requester, page)
        })
        .await?;
    Ok(Json(many(feedback)))
}
