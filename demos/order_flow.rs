use postmark::*;
use serde::{Deserialize, Serialize};

// Define your payload
#[derive(Payload, Serialize, Deserialize, Clone, Debug)]
struct OrderPlaced {
    order_id: u64,
    amount_cents: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    // Producer: build a typed envelope and seal it for transport
    let request = TypedEnvelope::<OrderPlaced>::new()
        .with_source(Endpoint::new("checkout").with_address("tcp://10.0.0.1:5000"))
        .with_target(Endpoint::new("billing"))
        .with_message(OrderPlaced {
            order_id: 42,
            amount_cents: 1999,
        });
    println!("sending   {request}");

    let bytes = request.seal(&JsonCodec)?.to_bytes();
    println!("{} bytes on the wire", bytes.len());

    // Consumer: decode the wire form and open the body
    let received = Envelope::from_bytes(&bytes)?;
    println!("received  {received}");
    let opened: TypedEnvelope<OrderPlaced> = received.open(&JsonCodec)?;
    println!("payload   {:?}", opened.message);

    // Reply, correlated with the request
    let reply = TypedEnvelope::<String>::new()
        .with_message_type("OrderAccepted")
        .with_correlation(opened.id().as_str(), opened.created_time())
        .with_source(Endpoint::new("billing"))
        .with_target(Endpoint::new("checkout"))
        .with_message("accepted".to_string());
    println!("replying  {reply}");
    Ok(())
}
