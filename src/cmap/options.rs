use serde::Deserialize;
use typed_builder::TypedBuilder;

/// Contains the options for creating a [`TcpConnectionPool`](crate::cmap::TcpConnectionPool).
#[derive(Clone, Debug, Default, Deserialize, TypedBuilder, PartialEq)]
#[builder(field_defaults(default, setter(strip_option)))]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ConnectionPoolOptions {
    /// The `host:port` address of the server to connect to.
    ///
    /// The default is `localhost:27017`.
    pub address: Option<String>,

    /// The maximum number of connections that may be checked out of the pool at the same time.
    /// Further check-outs wait until a connection is checked back in.
    ///
    /// The default is 10.
    pub max_pool_size: Option<u32>,

    /// The largest message that may be sent or received over a connection of the pool, header
    /// included.
    ///
    /// The default is [`DEFAULT_MAX_MESSAGE_LENGTH`](crate::wire::DEFAULT_MAX_MESSAGE_LENGTH).
    pub max_message_length: Option<usize>,
}
