use std::collections::BTreeMap;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::domain::sheets::record::Record;
use crate::domain::sheets::schema::sales;

use super::evaluation::percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum SaleType {
    #[strum(to_string = "Componente", serialize = "component")]
    Component,
    #[strum(to_string = "Licencia", serialize = "license")]
    License,
    #[strum(to_string = "Servicio", serialize = "service")]
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum SaleStatus {
    #[strum(to_string = "Posible", serialize = "possible")]
    Possible,
    #[strum(to_string = "Cerrado", serialize = "closed")]
    Closed,
    #[strum(to_string = "Perdido", serialize = "lost")]
    Lost,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub client_id: String,
    pub sale_type: SaleType,
    pub status: SaleStatus,
    pub amount: f64,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesKpis {
    pub opportunities: usize,
    pub closed_amount: f64,
    pub possible_amount: f64,
    /// Closed opportunities over all opportunities, in percent.
    pub conversion_rate: f64,
    pub amount_by_status: BTreeMap<String, f64>,
    /// Amount of closed sales per sale type.
    pub closed_by_type: BTreeMap<String, f64>,
}

impl SalesKpis {
    pub fn compute(records: &[Record]) -> Self {
        let mut amount_by_status = SaleStatus::iter()
            .map(|s| (s.to_string(), 0.0))
            .collect::<BTreeMap<_, _>>();
        let mut closed_by_type = BTreeMap::new();
        let mut closed_count = 0usize;

        for record in records {
            let status = record.text(sales::STATUS).trim();
            let amount = record.number(sales::AMOUNT);
            *amount_by_status.entry(status.to_string()).or_insert(0.0) += amount;
            if status.parse::<SaleStatus>() == Ok(SaleStatus::Closed) {
                closed_count += 1;
                let sale_type = record.text(sales::SALE_TYPE).trim().to_string();
                *closed_by_type.entry(sale_type).or_insert(0.0) += amount;
            }
        }

        let amount_of = |status: SaleStatus| {
            amount_by_status
                .get(&status.to_string())
                .copied()
                .unwrap_or(0.0)
        };

        Self {
            opportunities: records.len(),
            closed_amount: amount_of(SaleStatus::Closed),
            possible_amount: amount_of(SaleStatus::Possible),
            conversion_rate: percentage(closed_count as f64, records.len() as f64),
            amount_by_status,
            closed_by_type,
        }
    }
}
