//! Model ports and couplings.
//!
//! # Ports
//!
//! A [`Port`] is a typed, per-cycle buffer of events. Models expose ports as
//! public members and register them on their [`Component`](crate::model::Component)
//! at construction time. A `Port` is a cheap, clonable handle: clones refer
//! to the same buffer, which is how containers and the coordinator keep
//! access to the ports of the models they own.
//!
//! Output functions [`write()`](Port::write) values onto output ports and
//! transition functions [`read_all()`](Port::read_all) or
//! [`read_single()`](Port::read_single) values from input ports. The
//! coordinator clears every port at the end of each simulation cycle, so a
//! port only ever holds the events of the current cycle.
//!
//! # Couplings and chaining
//!
//! A [`Coupling`] is a directed edge from a source port to a destination
//! port. Couplings are normally created by
//! [`Coupled::add_coupling()`](crate::model::Coupled::add_coupling).
//!
//! By default, values are copied along couplings by the coordinator at each
//! cycle. In chained mode, the coupling is instead registered on both of its
//! endpoints and the destination port resolves its values lazily, at the
//! first read of the cycle, by reading all upstream sources in registration
//! order. The result is cached until the port is cleared, so that the cost of
//! walking a deep hierarchy is paid at most once per cycle and per port,
//! regardless of the number of readers.
//!
//! # Examples
//!
//! ```
//! use devsim::ports::{Coupling, Port};
//!
//! let source = Port::new("out");
//! let relay = Port::new("in");
//! let coupling = Coupling::new(&source, &relay);
//! relay.register_incoming(&coupling).unwrap();
//!
//! source.write_many([1, 2]);
//! assert_eq!(&*relay.read_all(), &[1, 2]);
//! assert_eq!(relay.read_single(), Ok(1));
//!
//! relay.clear();
//! source.clear();
//! assert!(relay.is_empty());
//! ```

mod coupling;
mod port;

use std::error::Error;
use std::fmt;

pub use coupling::Coupling;
pub(crate) use coupling::AnyCoupling;
pub use port::{AnyPort, Port};

/// Direction of a port, set when the port is registered on a component.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The port is not registered on any component.
    #[default]
    Unset,
    /// Input port.
    In,
    /// Output port.
    Out,
    /// Bidirectional port.
    InOut,
}

/// Error returned when reading a single value from an empty port.
///
/// An empty port is a normal occurrence: it merely signals that no event was
/// delivered to that port during the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyPortError;

impl fmt::Display for EmptyPortError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "the port holds no value for the current cycle")
    }
}

impl Error for EmptyPortError {}

/// Error returned when a coupling is malformed.
///
/// These errors are raised during bench assembly, before any simulation
/// takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouplingError {
    /// The coupling was registered on a port which is not its endpoint.
    EndpointMismatch {
        /// Name of the port on which registration was attempted.
        port: String,
        /// Description of the coupling.
        coupling: String,
    },
    /// One of the endpoints is neither the container nor one of its
    /// children.
    NotChild {
        /// Description of the coupling.
        coupling: String,
    },
    /// The source is an input port of an atomic model.
    AtomicInputAsSource {
        /// Name of the offending port.
        port: String,
    },
    /// The destination is an output port of an atomic model.
    AtomicOutputAsDestination {
        /// Name of the offending port.
        port: String,
    },
    /// One of the endpoints is not registered on any component.
    UnregisteredPort {
        /// Name of the offending port.
        port: String,
    },
}

impl fmt::Display for CouplingError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointMismatch { port, coupling } => write!(
                fmt,
                "coupling {coupling} does not have port '{port}' as its endpoint"
            ),
            Self::NotChild { coupling } => write!(
                fmt,
                "the endpoints of coupling {coupling} are not the container or its children"
            ),
            Self::AtomicInputAsSource { port } => write!(
                fmt,
                "input port '{port}' of an atomic model cannot be a coupling source"
            ),
            Self::AtomicOutputAsDestination { port } => write!(
                fmt,
                "output port '{port}' of an atomic model cannot be a coupling destination"
            ),
            Self::UnregisteredPort { port } => {
                write!(fmt, "port '{port}' is not registered on any component")
            }
        }
    }
}

impl Error for CouplingError {}
