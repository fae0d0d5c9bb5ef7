//! LUN 预留报表
//!
//! 遍历所有主机组下的 LUN，输出 LDEV ID 与预留标志。

use anyhow::{Context, Result};
use hsi_metrics::{reservation_rows, LunReservation};
use hsi_restapi::{HostGroup, Lun, StorageClient};
use tracing::{debug, info};

use crate::commands::{common, output};
use crate::config::CliConfig;

pub async fn handle(config: &CliConfig, reserved_only: bool) -> Result<()> {
    let csv = common::csv_options(config)?;
    let client = common::connect(config, None).await?;

    let outcome = collect(&client).await;
    let mut luns = common::finish(&client, outcome).await?;

    if reserved_only {
        luns.retain(LunReservation::is_reserved);
    }

    for lun in &luns {
        debug!("{} {}", lun.port_id, lun.summary());
    }

    output::render(config.output.format, &reservation_rows(&luns), &luns, &csv)
}

async fn collect(client: &StorageClient) -> Result<Vec<LunReservation>> {
    let groups = client.host_groups().list().await.context("查询主机组失败")?;

    let mut reservations = Vec::new();
    for group in &groups {
        let luns = client
            .luns()
            .list(&group.port_id, group.host_group_number)
            .await
            .with_context(|| format!("查询 LUN 失败: {}", group.host_group_id))?;

        reservations.extend(luns.into_iter().map(|lun| to_reservation(group, lun)));
    }

    info!(
        "共 {} 个主机组, {} 个 LUN",
        groups.len(),
        reservations.len()
    );
    Ok(reservations)
}

fn to_reservation(group: &HostGroup, lun: Lun) -> LunReservation {
    LunReservation {
        port_id: lun.port_id,
        host_group_number: lun.host_group_number,
        host_group_name: group.host_group_name.clone(),
        lun: lun.lun,
        ldev_id: lun.ldev_id,
        lu_host_reserve: lun.lu_host_reserve,
    }
}
