use anyhow::Result;

use crate::importer::{self, Fetcher, SiteRef, Source};
use crate::inventory::Inventory;
use crate::models::*;
use crate::utils;

use super::{invalid, ScriptLog, ScriptOutput, DEPLOY_SITE, NEW_BRANCH};

/// A run of identically-configured switches (role, model, name tag)
struct SwitchBatch {
    label: &'static str,
    tag: Option<&'static str>,
    role: DeviceRole,
    device_type: DeviceType,
    count: u32,
}

async fn resolve_batch(
    inv: &dyn Inventory,
    label: &'static str,
    tag: Option<&'static str>,
    role_name: &str,
    count: u32,
    model: Option<i64>,
) -> Result<Option<SwitchBatch>> {
    if count == 0 {
        return Ok(None);
    }

    let model = model.ok_or_else(|| invalid(format!("{} switch model is required when count > 0", label)))?;
    let device_type = inv
        .get_device_type(model)
        .await?
        .ok_or_else(|| invalid(format!("Device type {} not found", model)))?;
    let role = inv
        .find_device_role(role_name)
        .await?
        .ok_or_else(|| invalid(format!("Device role '{}' not found", role_name)))?;

    Ok(Some(SwitchBatch { label, tag, role, device_type, count }))
}

fn validate_site_name(name: &str) -> Result<String> {
    let slug = utils::slugify(name);
    if name.trim().is_empty() || slug.is_empty() {
        return Err(invalid("site_name must contain at least one letter or digit"));
    }
    Ok(slug)
}

async fn create_switches(
    inv: &dyn Inventory,
    site: &Site,
    batch: &SwitchBatch,
    management_interface: Option<&str>,
    log: &mut ScriptLog,
) -> Result<()> {
    for i in 1..=batch.count {
        let device = inv
            .create_device(&NewDevice {
                name: utils::switch_name(&site.slug, batch.tag, i),
                site_id: site.id,
                role_id: batch.role.id,
                device_type_id: batch.device_type.id,
                status: device_status::PLANNED.to_string(),
            })
            .await?;
        log.success(format!("Created new {} switch: {}", batch.label, device.name));

        if let Some(iface) = management_interface {
            match inv.create_interface(device.id, iface, "virtual").await {
                Ok(_) => log.info(format!("Created interface {} on {}", iface, device.name)),
                Err(e) => log.warning(format!("Failed to create interface {} on {}: {:#}", iface, device.name, e)),
            }
        }
    }
    Ok(())
}

/// CSV table of every device at the site: `name,make,model`
async fn device_table(inv: &dyn Inventory, site_id: i64) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(["name", "make", "model"])?;

    for device in inv.list_devices(site_id).await? {
        writer.write_record([
            device.name.as_str(),
            device.manufacturer.as_deref().unwrap_or(""),
            device.model.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush device table: {}", e))?;
    Ok(String::from_utf8(bytes)?.trim_end_matches('\n').to_string())
}

/// "New Branch": a planned site with N access switches
pub async fn new_branch(inv: &dyn Inventory, req: &NewBranchRequest) -> Result<ScriptOutput> {
    let slug = validate_site_name(&req.site_name)?;
    let batch = resolve_batch(
        inv,
        "access",
        None,
        switch_role::ACCESS,
        req.switch_count,
        Some(req.switch_model),
    )
    .await?;

    let mut log = ScriptLog::new(NEW_BRANCH);
    let output = match run_new_branch(inv, req, slug, batch, &mut log).await {
        Ok(table) => Some(table),
        Err(e) => {
            log.failure(format!("{:#}", e));
            None
        }
    };
    Ok(log.finish(output, None))
}

async fn run_new_branch(
    inv: &dyn Inventory,
    req: &NewBranchRequest,
    slug: String,
    batch: Option<SwitchBatch>,
    log: &mut ScriptLog,
) -> Result<String> {
    let site = inv
        .create_site(&NewSite {
            name: req.site_name.trim().to_string(),
            slug,
            status: site_status::PLANNED.to_string(),
            description: None,
        })
        .await?;
    log.success(format!("Created new site: {}", site.name));

    if let Some(batch) = &batch {
        create_switches(inv, &site, batch, None, log).await?;
    }

    device_table(inv, site.id).await
}

/// "Deploy Site with VLANs": site, prefix, core/access/cabin switches and
/// VLANs from a CSV source
pub async fn deploy_site(inv: &dyn Inventory, fetcher: &Fetcher, req: &DeploySiteRequest) -> Result<ScriptOutput> {
    let slug = validate_site_name(&req.site_name)?;
    utils::parse_cidr(&req.prefix).map_err(invalid)?;
    if req.csv_url.trim().is_empty() {
        return Err(invalid("csv_url is required"));
    }

    let mut batches = Vec::new();
    let specs = [
        ("Core", "CORE", switch_role::CORE, req.core_switch_count, req.core_switch_model),
        ("Access", "ACCESS", switch_role::ACCESS, req.access_switch_count, req.access_switch_model),
        ("Cabin", "CABIN", switch_role::CABIN, req.cabin_switch_count, req.cabin_switch_model),
    ];
    for (label, tag, role, count, model) in specs {
        if let Some(batch) = resolve_batch(inv, label, Some(tag), role, count, model).await? {
            batches.push(batch);
        }
    }

    let management_interface = req
        .management_interface
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut log = ScriptLog::new(DEPLOY_SITE);
    let site = match build_site(inv, req, slug, &batches, management_interface, &mut log).await {
        Ok(site) => site,
        Err(e) => {
            log.failure(format!("{:#}", e));
            return Ok(log.finish(None, None));
        }
    };

    let source = Source::parse(&req.csv_url);
    let site_ref = SiteRef { id: site.id, name: site.name.clone() };
    let report = match importer::import_vlans(inv, fetcher, &source, &site_ref, &req.column_map, None).await {
        Ok(report) => report,
        Err(e) => {
            log.failure(e.to_string());
            return Ok(log.finish(None, None));
        }
    };
    log.extend(report.log_entries());
    log.info("Completed VLAN creation for the site.");

    Ok(log.finish(None, Some(report)))
}

async fn build_site(
    inv: &dyn Inventory,
    req: &DeploySiteRequest,
    slug: String,
    batches: &[SwitchBatch],
    management_interface: Option<&str>,
    log: &mut ScriptLog,
) -> Result<Site> {
    let site = inv
        .create_site(&NewSite {
            name: req.site_name.trim().to_string(),
            slug,
            status: site_status::PLANNED.to_string(),
            description: Some(format!("Ship ID: {}", req.ship_id)),
        })
        .await?;
    log.success(format!("Created new site: {}", site.name));

    let prefix = inv
        .create_prefix(&NewPrefix {
            prefix: req.prefix.trim().to_string(),
            site_id: site.id,
            status: prefix_status::ACTIVE.to_string(),
            description: None,
        })
        .await?;
    log.success(format!("Created IP prefix {} for site {}", prefix.prefix, site.name));

    for batch in batches {
        create_switches(inv, &site, batch, management_interface, log).await?;
    }

    Ok(site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::inventory::{SiteStore, VlanStore};
    use crate::scripts::{InvalidInput, LogLevel};
    use std::path::Path;
    use std::time::Duration;

    async fn store_and_model() -> (Store, i64) {
        let store = Store::in_memory().await.unwrap();
        let model = store.list_device_types().await.unwrap()[0].id;
        (store, model)
    }

    fn fetcher(import_dir: &Path) -> Fetcher {
        Fetcher::new(Duration::from_secs(5), import_dir).unwrap()
    }

    async fn interface_names(store: &Store, device_id: i64) -> Vec<String> {
        store.list_interfaces(device_id).await.unwrap().into_iter().map(|i| i.name).collect()
    }

    fn deploy_request(model: i64, csv_url: String) -> DeploySiteRequest {
        DeploySiteRequest {
            site_name: "MS Aurora".to_string(),
            ship_id: "IMO-9876543".to_string(),
            prefix: "10.42.0.0/16".to_string(),
            core_switch_count: 2,
            core_switch_model: Some(model),
            access_switch_count: 1,
            access_switch_model: Some(model),
            cabin_switch_count: 0,
            cabin_switch_model: None,
            csv_url,
            column_map: Default::default(),
            management_interface: Some("mgmt0".to_string()),
        }
    }

    #[tokio::test]
    async fn test_new_branch_creates_switches_and_table() {
        let (store, model) = store_and_model().await;
        let req = NewBranchRequest { site_name: "Harbor One".to_string(), switch_count: 3, switch_model: model };

        let out = new_branch(&store, &req).await.unwrap();
        assert!(out.success);
        assert_eq!(out.log[0].message, "Created new site: Harbor One");
        assert_eq!(out.log[3].message, "Created new access switch: HARBOR-ONE-SW-3");

        let table = out.output.unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "name,make,model");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("HARBOR-ONE-SW-1,"));

        let site = store.list_sites().await.unwrap().remove(0);
        assert_eq!(site.slug, "harbor-one");
        assert_eq!(site.status, "planned");
    }

    #[tokio::test]
    async fn test_new_branch_rejects_unknown_model_before_writing() {
        let (store, _) = store_and_model().await;
        let req = NewBranchRequest { site_name: "Harbor".to_string(), switch_count: 1, switch_model: 9999 };

        let err = new_branch(&store, &req).await.unwrap_err();
        assert!(err.downcast_ref::<InvalidInput>().is_some());
        assert!(store.list_sites().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_branch_duplicate_site_is_logged() {
        let (store, model) = store_and_model().await;
        let req = NewBranchRequest { site_name: "Harbor".to_string(), switch_count: 0, switch_model: model };
        assert!(new_branch(&store, &req).await.unwrap().success);

        let out = new_branch(&store, &req).await.unwrap();
        assert!(!out.success);
        assert_eq!(out.log.last().unwrap().level, LogLevel::Failure);
        assert!(out.output.is_none());
    }

    #[tokio::test]
    async fn test_deploy_site_end_to_end() {
        let (store, model) = store_and_model().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("aurora.csv"), "VLAN_ID,VLAN_Name\n100,Guest\n200,Voice\nabc,Bad\n").unwrap();

        let req = deploy_request(model, "aurora.csv".to_string());
        let out = deploy_site(&store, &fetcher(dir.path()), &req).await.unwrap();

        let site = store.list_sites().await.unwrap().remove(0);
        assert_eq!(site.description.as_deref(), Some("Ship ID: IMO-9876543"));

        let prefixes = store.list_prefixes(site.id).await.unwrap();
        assert_eq!(prefixes[0].prefix, "10.42.0.0/16");

        let devices = store.list_devices(site.id).await.unwrap();
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["MS-AURORA-CORE-SW-1", "MS-AURORA-CORE-SW-2", "MS-AURORA-ACCESS-SW-1"]);
        for device in &devices {
            assert_eq!(interface_names(&store, device.id).await, vec!["mgmt0"]);
        }
        assert!(out.log.iter().any(|e| e.message == "Created interface mgmt0 on MS-AURORA-ACCESS-SW-1"));

        assert_eq!(store.list_vlans(site.id).await.unwrap().len(), 2);
        let report = out.report.unwrap();
        assert_eq!(report.counts.failed, 1);
        assert!(!out.success);
        assert_eq!(out.log.last().unwrap().message, "Completed VLAN creation for the site.");
    }

    #[tokio::test]
    async fn test_deploy_site_fetch_failure_keeps_site() {
        let (store, model) = store_and_model().await;
        let dir = tempfile::tempdir().unwrap();
        let req = deploy_request(model, "missing.csv".to_string());

        let out = deploy_site(&store, &fetcher(dir.path()), &req).await.unwrap();
        assert!(!out.success);
        assert!(out.report.is_none());
        assert!(out.log.last().unwrap().message.starts_with("Failed to fetch the CSV file"));
        assert_eq!(store.list_sites().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deploy_site_cabin_switches() {
        let (store, model) = store_and_model().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cabins.csv"), "vlan_id,vlan_name\n300,Cabins\n").unwrap();

        let mut req = deploy_request(model, "cabins.csv".to_string());
        req.core_switch_count = 0;
        req.access_switch_count = 0;
        req.cabin_switch_count = 2;
        req.cabin_switch_model = Some(model);
        req.management_interface = None;

        let out = deploy_site(&store, &fetcher(dir.path()), &req).await.unwrap();
        assert!(out.success);
        assert!(out.log.iter().any(|e| e.message == "Created new Cabin switch: MS-AURORA-CABIN-SW-2"));

        let site = store.list_sites().await.unwrap().remove(0);
        let devices = store.list_devices(site.id).await.unwrap();
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["MS-AURORA-CABIN-SW-1", "MS-AURORA-CABIN-SW-2"]);
        for device in &devices {
            assert_eq!(device.role_name.as_deref(), Some(switch_role::CABIN));
            assert!(interface_names(&store, device.id).await.is_empty());
        }
        assert_eq!(store.list_vlans(site.id).await.unwrap()[0].vid, 300);
    }

    #[tokio::test]
    async fn test_deploy_site_validation() {
        let (store, model) = store_and_model().await;
        let dir = tempfile::tempdir().unwrap();

        let mut req = deploy_request(model, "vlans.csv".to_string());
        req.prefix = "10.0.0.0/40".to_string();
        assert!(deploy_site(&store, &fetcher(dir.path()), &req).await.is_err());

        let mut req = deploy_request(model, "vlans.csv".to_string());
        req.cabin_switch_count = 4;
        let err = deploy_site(&store, &fetcher(dir.path()), &req).await.unwrap_err();
        assert!(err.to_string().contains("Cabin switch model is required"));

        assert!(store.list_sites().await.unwrap().is_empty());
    }
}
