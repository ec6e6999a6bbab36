// Values that flow from an inbound notify request down to the durable queue.

mod cloud;
mod delivery;
mod dispatch;
mod message;
mod options;
mod recipient;
mod token;

pub use self::{
    cloud::{Organization, Space},
    delivery::{Delivery, DELIVERY_JOB_TYPE},
    dispatch::{Audience, Client, Dispatch, Html, Kind, Message, OrganizationRole, VcapRequest},
    message::{MessageStatus, MessageStatusRecord, Response},
    options::Options,
    recipient::Recipient,
    token::Token,
};
