// src/fetch/query.rs

use url::form_urlencoded;

use crate::{period::Period, schema};

/// Form body for the BTS `DownLoad_Table.asp` endpoint, selecting every
/// column in [`schema::COLUMNS`] for a single month.
pub fn form_body(period: Period) -> String {
    let columns = schema::column_list();
    let year = period.year().to_string();
    let sql = format!(
        " SELECT {} FROM  T_ONTIME WHERE Month ={} AND YEAR={}",
        columns,
        period.month(),
        year
    );

    let mut form = form_urlencoded::Serializer::new(String::new());
    form.append_pair("UserTableName", "On_Time_Performance")
        .append_pair("DBShortName", "")
        .append_pair("RawDataTable", "T_ONTIME")
        .append_pair("sqlstr", &sql)
        .append_pair("varlist", &columns)
        .append_pair("grouplist", "")
        .append_pair("suml", "")
        .append_pair("sumRegion", "")
        .append_pair("filter1", "title=")
        .append_pair("filter2", "title=")
        .append_pair("geo", "All")
        .append_pair("time", period.month_name())
        .append_pair("timename", "Month")
        .append_pair("GEOGRAPHY", "All")
        .append_pair("XYEAR", &year)
        .append_pair("FREQUENCY", "3");

    for column in schema::COLUMNS.iter() {
        form.append_pair("VarName", column.name)
            .append_pair("VarDesc", column.description)
            .append_pair("VarType", column.ty.as_str());
    }

    form.finish()
}
