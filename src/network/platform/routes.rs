//! Default-route discovery over rtnetlink.

use std::net::Ipv4Addr;
use std::pin::pin;

use futures::TryStreamExt;
use netlink_packet_route::route::{RouteAddress, RouteAttribute, RouteMessage};
use rtnetlink::{RouteMessageBuilder, new_connection};

use crate::network::LinkError;

/// Returns the default-route gateways leaving through interface `index`,
/// lowest metric first.
///
/// Blocks the calling thread on a private current-thread runtime, so it must
/// be called from a blocking context (`spawn_blocking` or a plain thread),
/// never from an async task.
///
/// # Errors
///
/// Returns [`LinkError::Platform`] when the netlink socket cannot be opened
/// or the route dump fails.
pub fn default_gateways(index: u32) -> Result<Vec<Ipv4Addr>, LinkError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LinkError::Platform {
            message: format!("netlink runtime unavailable: {e}"),
        })?;

    let routes = runtime.block_on(dump_ipv4_routes())?;
    Ok(select_default_gateways(&routes, index))
}

async fn dump_ipv4_routes() -> Result<Vec<RouteMessage>, LinkError> {
    let (connection, handle, _) = new_connection().map_err(|e| LinkError::Platform {
        message: format!("unable to create netlink socket: {e}"),
    })?;
    tokio::spawn(connection);

    let request = RouteMessageBuilder::<Ipv4Addr>::default().build();
    let mut routes = pin!(handle.route().get(request).execute());

    let mut messages = Vec::new();
    while let Some(route) = routes.try_next().await.map_err(|e| LinkError::Platform {
        message: format!("route dump failed: {e}"),
    })? {
        messages.push(route);
    }
    Ok(messages)
}

/// Picks the gateways of `0.0.0.0/0` routes whose output interface is `index`.
fn select_default_gateways(routes: &[RouteMessage], index: u32) -> Vec<Ipv4Addr> {
    let mut gateways: Vec<(u32, Ipv4Addr)> = routes
        .iter()
        .filter(|route| route.header.destination_prefix_length == 0)
        .filter_map(|route| {
            let mut oif = None;
            let mut gateway = None;
            let mut metric = 0;
            for attribute in &route.attributes {
                match attribute {
                    RouteAttribute::Oif(idx) => oif = Some(*idx),
                    RouteAttribute::Gateway(RouteAddress::Inet(v4)) => gateway = Some(*v4),
                    RouteAttribute::Priority(priority) => metric = *priority,
                    _ => {}
                }
            }
            if oif != Some(index) {
                return None;
            }
            gateway.map(|gateway| (metric, gateway))
        })
        .collect();

    // Stable: equal metrics keep kernel order.
    gateways.sort_by_key(|(metric, _)| *metric);
    gateways.into_iter().map(|(_, gateway)| gateway).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(prefix_len: u8, attributes: Vec<RouteAttribute>) -> RouteMessage {
        let mut message = RouteMessage::default();
        message.header.destination_prefix_length = prefix_len;
        message.attributes = attributes;
        message
    }

    fn default_via(oif: u32, gateway: Ipv4Addr, metric: u32) -> RouteMessage {
        route(
            0,
            vec![
                RouteAttribute::Oif(oif),
                RouteAttribute::Gateway(RouteAddress::Inet(gateway)),
                RouteAttribute::Priority(metric),
            ],
        )
    }

    #[test]
    fn picks_default_route_of_interface() {
        let routes = vec![
            default_via(2, Ipv4Addr::new(192, 168, 1, 1), 100),
            default_via(3, Ipv4Addr::new(10, 0, 0, 1), 50),
        ];

        assert_eq!(
            select_default_gateways(&routes, 2),
            vec![Ipv4Addr::new(192, 168, 1, 1)]
        );
    }

    #[test]
    fn ignores_non_default_destinations() {
        let routes = vec![route(
            24,
            vec![
                RouteAttribute::Oif(2),
                RouteAttribute::Gateway(RouteAddress::Inet(Ipv4Addr::new(192, 168, 1, 1))),
            ],
        )];

        assert!(select_default_gateways(&routes, 2).is_empty());
    }

    #[test]
    fn skips_default_route_without_gateway() {
        let routes = vec![route(0, vec![RouteAttribute::Oif(2)])];

        assert!(select_default_gateways(&routes, 2).is_empty());
    }

    #[test]
    fn orders_by_metric() {
        let routes = vec![
            default_via(2, Ipv4Addr::new(192, 168, 1, 2), 200),
            default_via(2, Ipv4Addr::new(192, 168, 1, 1), 100),
            default_via(2, Ipv4Addr::new(192, 168, 1, 3), 200),
        ];

        assert_eq!(
            select_default_gateways(&routes, 2),
            vec![
                Ipv4Addr::new(192, 168, 1, 1),
                Ipv4Addr::new(192, 168, 1, 2),
                Ipv4Addr::new(192, 168, 1, 3),
            ]
        );
    }
}
