//! WebSocket bridge onto an order's location channel.
//!
//! Connection lifecycle:
//! 1. Open (or reuse) the order's location channel
//! 2. Send a `connected` message
//! 3. Forward every channel event to the client as JSON
//! 4. Accept `location` and `ping` messages from the client
//! 5. Release the client on disconnect; the location channel closes when
//!    the last live client leaves

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;

use crate::application::{DeliveryError, DeliveryTracking, Subscription};
use crate::domain::delivery::{ChannelTopic, CourierLocation};
use crate::domain::foundation::{CourierId, OrderId, Timestamp};
use crate::ports::RealtimeEvent;

use super::super::error::ApiError;
use super::super::AppState;

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Connected {
        order_id: OrderId,
        channel: String,
        timestamp: Timestamp,
    },
    Event {
        event: RealtimeEvent,
    },
    Error {
        code: String,
        message: String,
    },
    Pong,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
    #[serde(rename_all = "camelCase")]
    Location {
        courier_id: CourierId,
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        heading: Option<f64>,
        #[serde(default)]
        speed_kmh: Option<f64>,
    },
}

/// GET /api/deliveries/:order_id/live
pub async fn live_handler(
    ws: WebSocketUpgrade,
    Path(order_id): Path<OrderId>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let subscription = state.delivery.watch_location(&order_id).await?;
    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, order_id, subscription, state))
        .into_response())
}

async fn handle_socket(
    socket: WebSocket,
    order_id: OrderId,
    subscription: Subscription,
    state: AppState,
) {
    let delivery = state.delivery.clone();
    serve_socket(socket, order_id.clone(), subscription, state).await;
    delivery.unwatch_location(&order_id).await;
    tracing::debug!(order_id = %order_id, "Live connection closed");
}

async fn serve_socket(
    socket: WebSocket,
    order_id: OrderId,
    subscription: Subscription,
    state: AppState,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = subscription.events;

    let connected = ServerMessage::Connected {
        order_id: order_id.clone(),
        channel: ChannelTopic::Location.channel_name(&order_id),
        timestamp: Timestamp::now(),
    };
    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!(order_id = %order_id, error = %e, "Client left before connecting");
        return;
    }

    let (direct_tx, mut direct_rx) = tokio::sync::mpsc::channel::<ServerMessage>(16);

    // Channel events and direct replies share the sink
    let send_order = order_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => ServerMessage::Event { event },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(order_id = %send_order, skipped, "Live client lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
                direct = direct_rx.recv() => match direct {
                    Some(message) => message,
                    None => break,
                },
            };
            if let Err(e) = send_message(&mut sender, &message).await {
                tracing::debug!(order_id = %send_order, error = %e, "Send error, closing");
                break;
            }
        }
    });

    let delivery = state.delivery.clone();
    let recv_order = order_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let reply = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => {
                            handle_client_message(&delivery, &recv_order, message).await
                        }
                        Err(e) => Some(ServerMessage::Error {
                            code: "BAD_MESSAGE".to_string(),
                            message: e.to_string(),
                        }),
                    };
                    if let Some(reply) = reply {
                        if direct_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Binary(_)) => {
                    tracing::warn!(order_id = %recv_order, "Ignoring binary message");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(order_id = %recv_order, error = %e, "Receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

async fn handle_client_message(
    delivery: &DeliveryTracking,
    order_id: &OrderId,
    message: ClientMessage,
) -> Option<ServerMessage> {
    match message {
        ClientMessage::Ping => Some(ServerMessage::Pong),
        ClientMessage::Location {
            courier_id,
            latitude,
            longitude,
            heading,
            speed_kmh,
        } => {
            let result = publish_location(
                delivery,
                order_id,
                courier_id,
                (latitude, longitude),
                heading,
                speed_kmh,
            )
            .await;
            result.err().map(|e| ServerMessage::Error {
                code: e.code().to_string(),
                message: e.to_string(),
            })
        }
    }
}

async fn publish_location(
    delivery: &DeliveryTracking,
    order_id: &OrderId,
    courier_id: CourierId,
    (latitude, longitude): (f64, f64),
    heading: Option<f64>,
    speed_kmh: Option<f64>,
) -> Result<(), DeliveryError> {
    let mut location = CourierLocation::new(order_id.clone(), courier_id, latitude, longitude)?;
    location.heading = heading;
    location.speed_kmh = speed_kmh;
    delivery.update_courier_location(&location).await?;
    Ok(())
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::app_router;
    use crate::adapters::http::test_support::test_state_with_transport;
    use serde_json::json;
    use std::time::Duration;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    #[test]
    fn client_location_message_parses() {
        let message: ClientMessage = serde_json::from_value(json!({
            "type": "location",
            "courierId": "c7",
            "latitude": -23.5,
            "longitude": -46.6,
            "speedKmh": 22.0
        }))
        .unwrap();
        match message {
            ClientMessage::Location {
                courier_id,
                speed_kmh,
                heading,
                ..
            } => {
                assert_eq!(courier_id, CourierId::from("c7"));
                assert_eq!(speed_kmh, Some(22.0));
                assert_eq!(heading, None);
            }
            ClientMessage::Ping => panic!("expected location"),
        }
    }

    #[test]
    fn event_message_wraps_realtime_event() {
        let message = ServerMessage::Event {
            event: RealtimeEvent::broadcast("location-update", json!({"latitude": 1.0})),
        };
        let value = serde_json::to_value(message).unwrap();
        assert_eq!(value["type"], "event");
        assert_eq!(value["event"]["type"], "broadcast");
        assert_eq!(value["event"]["event"], "location-update");
    }

    #[test]
    fn connected_message_uses_camel_case() {
        let value = serde_json::to_value(ServerMessage::Connected {
            order_id: OrderId::from("42"),
            channel: "delivery-location:42".to_string(),
            timestamp: Timestamp::from_unix_secs(0),
        })
        .unwrap();
        assert_eq!(value["type"], "connected");
        assert_eq!(value["orderId"], "42");
    }

    #[tokio::test]
    async fn location_channel_closes_after_last_client_disconnects() {
        let (state, transport) = test_state_with_transport().await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app_router(state)).await.unwrap();
        });
        let url = format!("ws://{}/api/deliveries/42/live", addr);

        let (mut first, _) = connect_async(url.as_str()).await.unwrap();
        let (mut second, _) = connect_async(url.as_str()).await.unwrap();
        for client in [&mut first, &mut second] {
            let Some(Ok(WsMessage::Text(text))) = client.next().await else {
                panic!("expected a connected message");
            };
            assert!(text.contains("\"connected\""));
        }
        assert_eq!(transport.channel_count().await, 1);

        first.close(None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(transport.channel_count().await, 1);

        second.close(None).await.unwrap();
        let mut remaining = transport.channel_count().await;
        for _ in 0..50 {
            if remaining == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            remaining = transport.channel_count().await;
        }
        assert_eq!(remaining, 0);
    }
}
