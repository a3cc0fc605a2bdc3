use crate::{
    db::{observe, query_builder::SearchColumn, DbPool, FilterBuilder, PageBounds, Pagination},
    entities::{acionamento, perda},
    errors::ServiceError,
    normalize::{
        clean_param, clean_text, parse_date_param, parse_loose_date, parse_loose_int,
        parse_loose_number, upper_text, validate_record_id,
    },
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Which backing table a `/records` call addresses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RecordMode {
    Drives,
    Loss,
}

impl RecordMode {
    /// Missing or blank selects `drives`; anything else must name a mode.
    pub fn resolve(raw: Option<&str>) -> Result<Self, ServiceError> {
        match clean_param(raw) {
            None => Ok(RecordMode::Drives),
            Some(mode) => mode
                .parse()
                .map_err(|_| ServiceError::validation(format!("mode inválido: '{}'", mode))),
        }
    }
}

/// Query parameters of `GET /records`. Values stay textual so malformed input
/// degrades to defaults instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordListParams {
    /// `drives` (default) or `loss`
    pub mode: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// Free-text search
    pub q: Option<String>,
    pub usina: Option<String>,
    /// Drives only
    pub equipamento: Option<String>,
    /// Inclusive lower bound on `data`; required in drives mode
    pub start: Option<String>,
    /// Inclusive upper bound on `data`; required in drives mode
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RecordRow {
    Drive(acionamento::Model),
    Loss(perda::Model),
}

const DRIVE_SEARCH: [SearchColumn<acionamento::Column>; 10] = [
    SearchColumn::Text(acionamento::Column::Usina),
    SearchColumn::Text(acionamento::Column::Semana),
    SearchColumn::Text(acionamento::Column::Cliente),
    SearchColumn::Text(acionamento::Column::Equipamento),
    SearchColumn::Text(acionamento::Column::Alarme),
    SearchColumn::Text(acionamento::Column::MotivoMobilizacao),
    SearchColumn::Text(acionamento::Column::ProblemaIdentificado),
    SearchColumn::Text(acionamento::Column::SolucaoImediata),
    SearchColumn::Text(acionamento::Column::SolucaoDefinitiva),
    SearchColumn::Cast(acionamento::Column::Chamado),
];

const LOSS_SEARCH: [SearchColumn<perda::Column>; 7] = [
    SearchColumn::Text(perda::Column::Usina),
    SearchColumn::Cast(perda::Column::Cmp),
    SearchColumn::Cast(perda::Column::Skid),
    SearchColumn::Cast(perda::Column::Inversor),
    SearchColumn::Cast(perda::Column::Tcu),
    SearchColumn::Cast(perda::Column::Ncu),
    SearchColumn::Cast(perda::Column::StringLoss),
];

/// Dispatch (`acionamentos`) and loss (`perdas`) records
#[derive(Clone)]
pub struct RecordService {
    db_pool: Arc<DbPool>,
}

impl RecordService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists one page of records, newest first.
    ///
    /// Drives mode refuses to run without both date bounds; no query is issued
    /// in that case.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        mode: RecordMode,
        params: &RecordListParams,
    ) -> Result<Vec<RecordRow>, ServiceError> {
        let db = &*self.db_pool;
        let start = parse_date_param(params.start.as_deref());
        let end = parse_date_param(params.end.as_deref());
        let usina = clean_param(params.usina.as_deref()).map(|u| u.to_uppercase());
        let q = params.q.as_deref();

        match mode {
            RecordMode::Drives => {
                let (Some(start), Some(end)) = (start, end) else {
                    return Err(ServiceError::MissingDateRange(
                        "Informe o período (start e end) para consultar acionamentos".to_string(),
                    ));
                };
                let page = Pagination::clamp(
                    params.limit.as_deref(),
                    params.offset.as_deref(),
                    PageBounds::DRIVES,
                );
                debug!(?page, %start, %end, "Querying acionamentos");

                let query = FilterBuilder::new()
                    .eq(acionamento::Column::Usina, usina)
                    .eq(
                        acionamento::Column::Equipamento,
                        clean_param(params.equipamento.as_deref()),
                    )
                    .between(acionamento::Column::Data, Some(start), Some(end))
                    .contains_any(q, &DRIVE_SEARCH)
                    .apply(acionamento::Entity::find())
                    .order_by_desc(acionamento::Column::Data);

                let rows = observe("acionamentos.list", page.apply(query).all(db)).await?;
                Ok(rows.into_iter().map(RecordRow::Drive).collect())
            }
            RecordMode::Loss => {
                let page = Pagination::clamp(
                    params.limit.as_deref(),
                    params.offset.as_deref(),
                    PageBounds::LOSS,
                );
                debug!(?page, "Querying perdas");

                let query = FilterBuilder::new()
                    .eq(perda::Column::Usina, usina)
                    .between(perda::Column::Data, start, end)
                    .contains_any(q, &LOSS_SEARCH)
                    .apply(perda::Entity::find())
                    .order_by_desc(perda::Column::Data);

                let rows = observe("perdas.list", page.apply(query).all(db)).await?;
                Ok(rows.into_iter().map(RecordRow::Loss).collect())
            }
        }
    }

    /// Inserts a record and returns its generated id.
    #[instrument(skip(self, body))]
    pub async fn create(&self, mode: RecordMode, body: &Value) -> Result<Uuid, ServiceError> {
        let db = &*self.db_pool;
        let fields = body_fields(body)?;

        let data = parse_loose_date(fields.get("data"))
            .ok_or_else(|| ServiceError::validation("data é obrigatória (YYYY-MM-DD)"))?;
        let usina = upper_text(fields.get("usina"))
            .ok_or_else(|| ServiceError::validation("usina é obrigatória"))?;
        let id = Uuid::new_v4();

        match mode {
            RecordMode::Drives => {
                let (mut model, _) = drive_fields(fields)?;
                model.id = Set(id);
                model.data = Set(data);
                model.usina = Set(usina);
                observe("acionamentos.insert", model.insert(db)).await?;
            }
            RecordMode::Loss => {
                let (mut model, _) = loss_fields(fields)?;
                model.id = Set(id);
                model.data = Set(data);
                model.usina = Set(usina);
                observe("perdas.insert", model.insert(db)).await?;
            }
        }

        info!(%id, %mode, "Record created");
        Ok(id)
    }

    /// Writes only the patchable keys present in `body`.
    #[instrument(skip(self, body))]
    pub async fn patch(&self, mode: RecordMode, id: &str, body: &Value) -> Result<(), ServiceError> {
        let id = validate_record_id(id)?;
        let db = &*self.db_pool;
        let fields = body_fields(body)?;

        match mode {
            RecordMode::Drives => {
                let (model, touched) = drive_fields(fields)?;
                ensure_touched(touched)?;
                observe(
                    "acionamentos.update",
                    acionamento::Entity::update_many()
                        .set(model)
                        .filter(acionamento::Column::Id.eq(id))
                        .exec(db),
                )
                .await?;
            }
            RecordMode::Loss => {
                let (model, touched) = loss_fields(fields)?;
                ensure_touched(touched)?;
                observe(
                    "perdas.update",
                    perda::Entity::update_many()
                        .set(model)
                        .filter(perda::Column::Id.eq(id))
                        .exec(db),
                )
                .await?;
            }
        }

        info!(%id, %mode, "Record updated");
        Ok(())
    }

    /// Deletes by id. Unknown ids are not distinguished from deleted ones.
    #[instrument(skip(self))]
    pub async fn delete(&self, mode: RecordMode, id: &str) -> Result<(), ServiceError> {
        let id = validate_record_id(id)?;
        let db = &*self.db_pool;

        let result = match mode {
            RecordMode::Drives => {
                observe(
                    "acionamentos.delete",
                    acionamento::Entity::delete_by_id(id).exec(db),
                )
                .await?
            }
            RecordMode::Loss => {
                observe("perdas.delete", perda::Entity::delete_by_id(id).exec(db)).await?
            }
        };

        info!(%id, %mode, rows_affected = result.rows_affected, "Record deleted");
        Ok(())
    }
}

pub(crate) fn body_fields(body: &Value) -> Result<&Map<String, Value>, ServiceError> {
    body.as_object()
        .ok_or_else(|| ServiceError::validation("O corpo da requisição deve ser um objeto JSON"))
}

pub(crate) fn ensure_touched(touched: usize) -> Result<(), ServiceError> {
    if touched == 0 {
        return Err(ServiceError::validation("Nenhum campo para atualizar"));
    }
    Ok(())
}

/// Maps the recognised keys of `fields` onto an active model; other keys are
/// ignored. Returns how many columns were set.
fn drive_fields(
    fields: &Map<String, Value>,
) -> Result<(acionamento::ActiveModel, usize), ServiceError> {
    let mut model = <acionamento::ActiveModel as Default>::default();
    let mut touched = 0;

    for (key, value) in fields {
        let value = Some(value);
        match key.as_str() {
            "data" => {
                let data = parse_loose_date(value)
                    .ok_or_else(|| ServiceError::validation("data inválida (YYYY-MM-DD)"))?;
                model.data = Set(data);
            }
            "usina" => {
                let usina = upper_text(value)
                    .ok_or_else(|| ServiceError::validation("usina não pode ficar vazia"))?;
                model.usina = Set(usina);
            }
            "cliente" => model.cliente = Set(upper_text(value)),
            "semana" => model.semana = Set(clean_text(value)),
            "equipamento" => model.equipamento = Set(clean_text(value)),
            "alarme" => model.alarme = Set(clean_text(value)),
            "motivo_mobilizacao" => model.motivo_mobilizacao = Set(clean_text(value)),
            "problema_identificado" => model.problema_identificado = Set(clean_text(value)),
            "solucao_imediata" => model.solucao_imediata = Set(clean_text(value)),
            "solucao_definitiva" => model.solucao_definitiva = Set(clean_text(value)),
            "chamado" => {
                let chamado = match clean_text(value) {
                    None => None,
                    Some(raw) => Some(parse_loose_int(value).ok_or_else(|| {
                        ServiceError::validation(format!("chamado inválido: '{}'", raw))
                    })?),
                };
                model.chamado = Set(chamado);
            }
            _ => continue,
        }
        touched += 1;
    }

    Ok((model, touched))
}

fn loss_fields(fields: &Map<String, Value>) -> Result<(perda::ActiveModel, usize), ServiceError> {
    let mut model = <perda::ActiveModel as Default>::default();
    let mut touched = 0;

    for (key, value) in fields {
        let value = Some(value);
        match key.as_str() {
            "data" => {
                let data = parse_loose_date(value)
                    .ok_or_else(|| ServiceError::validation("data inválida (YYYY-MM-DD)"))?;
                model.data = Set(data);
            }
            "usina" => {
                let usina = upper_text(value)
                    .ok_or_else(|| ServiceError::validation("usina não pode ficar vazia"))?;
                model.usina = Set(usina);
            }
            // loss components never fail the request; garbage becomes null
            "cmp" => model.cmp = Set(parse_loose_number(value)),
            "skid" => model.skid = Set(parse_loose_number(value)),
            "inversor" => model.inversor = Set(parse_loose_number(value)),
            "tcu" => model.tcu = Set(parse_loose_number(value)),
            "ncu" => model.ncu = Set(parse_loose_number(value)),
            "string" => model.string_loss = Set(parse_loose_number(value)),
            _ => continue,
        }
        touched += 1;
    }

    Ok((model, touched))
}
