use anyhow::Result;

use crate::db::NotFoundError;
use crate::importer::{self, Fetcher, GroupRef, SiteRef, Source};
use crate::inventory::Inventory;
use crate::models::*;
use crate::utils;

use super::{invalid, ScriptLog, ScriptOutput, CREATE_VLANS, IMPORT_VLANS};

async fn require_site(inv: &dyn Inventory, site_id: i64) -> Result<SiteRef> {
    let site = inv
        .get_site(site_id)
        .await?
        .ok_or_else(|| NotFoundError::new("Site", &site_id.to_string()))?;
    Ok(SiteRef { id: site.id, name: site.name })
}

/// "Create VLANs from CSV": a VLAN group for the site, then every CSV row as
/// a VLAN in that group
pub async fn create_vlans(inv: &dyn Inventory, fetcher: &Fetcher, req: &CreateVlansRequest) -> Result<ScriptOutput> {
    let group_slug = utils::slugify(&req.vlan_group_name);
    if group_slug.is_empty() {
        return Err(invalid("vlan_group_name must contain at least one letter or digit"));
    }
    if req.source.trim().is_empty() {
        return Err(invalid("source is required"));
    }
    let site = require_site(inv, req.site_id).await?;

    let mut log = ScriptLog::new(CREATE_VLANS);
    let group = match inv
        .create_vlan_group(&NewVlanGroup {
            name: req.vlan_group_name.trim().to_string(),
            slug: group_slug,
            site_id: site.id,
        })
        .await
    {
        Ok(group) => group,
        Err(e) => {
            log.failure(format!("{:#}", e));
            return Ok(log.finish(None, None));
        }
    };
    log.success(format!("Created VLAN Group: {}", group.name));

    let group_ref = GroupRef { id: group.id, name: group.name };
    let source = Source::parse(&req.source);
    match importer::import_vlans(inv, fetcher, &source, &site, &req.column_map, Some(&group_ref)).await {
        Ok(report) => {
            log.extend(report.log_entries());
            let summary = report.summary_csv()?;
            Ok(log.finish(Some(summary), Some(report)))
        }
        Err(e) => {
            log.failure(e.to_string());
            Ok(log.finish(None, None))
        }
    }
}

/// "Import VLANs": CSV rows as VLANs of an existing site. Fetch and header
/// failures are returned as errors since nothing has been written yet.
pub async fn import_vlans(inv: &dyn Inventory, fetcher: &Fetcher, req: &ImportVlansRequest) -> Result<ScriptOutput> {
    if req.source.trim().is_empty() {
        return Err(invalid("source is required"));
    }
    let site = require_site(inv, req.site_id).await?;

    let source = Source::parse(&req.source);
    let report = importer::import_vlans(inv, fetcher, &source, &site, &req.column_map, None).await?;

    let mut log = ScriptLog::new(IMPORT_VLANS);
    log.extend(report.log_entries());
    let summary = report.summary_csv()?;
    Ok(log.finish(Some(summary), Some(report)))
}
