//! describe-table: summarize a tabular artifact.

use serde_json::Value;

use super::{check_id_field, required_input, Primitive, PrimitiveContext};
use crate::application::arguments::param;
use crate::domain::entities::{Artifact, InvocationArgs, WarningsLedger};
use crate::domain::services::{extract_tabular_metadata, TabularOptions};
use crate::error::CanopyResult;

pub struct DescribeTable;

impl DescribeTable {
    pub const NAME: &'static str = "describe-table";
}

impl Primitive for DescribeTable {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(
        &self,
        ctx: &PrimitiveContext<'_>,
        args: &InvocationArgs,
        ledger: &mut WarningsLedger,
    ) -> CanopyResult<Value> {
        let table_path = required_input(args, "table")?;
        let options = TabularOptions {
            id_field: param::<String>(args.params(), "id_field")?,
            spatial_unit: param::<String>(args.params(), "spatial_unit")?,
        };

        let table = ctx.engine.read_table(&table_path)?;
        ctx.engine.write_table(&table, args.output())?;

        let metadata = extract_tabular_metadata(&Artifact::Tabular(table), &options)?;
        check_id_field(ledger, options.id_field.as_deref(), &metadata.variables);

        Ok(serde_json::to_value(metadata)?)
    }
}
