/*!

Cycle-delayed pipelined channels between routers and network interfaces.

A `NetworkLink` carries flits; a `CreditLink` carries credits the opposite way. Each link has exactly one producer endpoint and one consumer endpoint. A flit inserted in the producer's output buffer at cycle `t` is taken by the link at `t+1` and delivered `latency-1` cycles later, so a hop costs `1+latency` cycles.

Optional bridges (clock-domain crossing or serializer/deserializer) at either end are pass-through with additional latency, folded into the link latency at construction.

*/

use std::mem::size_of;

use crate::event::Time;
use crate::quantify::Quantifiable;

///What kind of traffic a network link carries, for the per-kind utilization statistics.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum LinkType
{
	///From a network interface into a router.
	ExtIn,
	///From a router to a network interface.
	ExtOut,
	///Router to router.
	Internal,
}

///One endpoint of a link.
///For a `NetworkLink` a `RouterPort` names an outport on the producer side and an inport on the consumer side.
///For a `CreditLink` it is the other way around: credits are produced by input units and consumed by output units.
#[derive(Clone,Copy,Debug)]
pub enum LinkEndpoint
{
	RouterPort{
		router: usize,
		port: usize,
	},
	Interface{
		interface: usize,
	},
}

///A channel moving flits forward with a fixed latency.
pub struct NetworkLink
{
	pub id: usize,
	pub link_type: LinkType,
	pub latency: Time,
	pub source: LinkEndpoint,
	pub destination: LinkEndpoint,
	///Total number of flits that have traversed the link.
	pub utilization: u64,
	///Traversals per virtual channel.
	pub vc_load: Vec<u64>,
}

impl NetworkLink
{
	pub fn new(id:usize, link_type:LinkType, latency:Time, source:LinkEndpoint, destination:LinkEndpoint, num_vcs:usize) -> NetworkLink
	{
		assert!(latency>=1,"links deliver at the earliest in the next cycle");
		NetworkLink{
			id,
			link_type,
			latency,
			source,
			destination,
			utilization: 0,
			vc_load: vec![0;num_vcs],
		}
	}
	pub fn track_traversal(&mut self, vc:usize)
	{
		self.utilization+=1;
		self.vc_load[vc]+=1;
	}
	pub fn reset_statistics(&mut self)
	{
		self.utilization=0;
		for load in self.vc_load.iter_mut()
		{
			*load=0;
		}
	}
}

///A channel moving credits backward with a fixed latency.
pub struct CreditLink
{
	pub id: usize,
	pub latency: Time,
	pub source: LinkEndpoint,
	pub destination: LinkEndpoint,
}

impl CreditLink
{
	pub fn new(id:usize, latency:Time, source:LinkEndpoint, destination:LinkEndpoint) -> CreditLink
	{
		assert!(latency>=1,"links deliver at the earliest in the next cycle");
		CreditLink{
			id,
			latency,
			source,
			destination,
		}
	}
}

impl Quantifiable for NetworkLink
{
	fn total_memory(&self) -> usize
	{
		size_of::<NetworkLink>() + self.vc_load.capacity()*size_of::<u64>()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

impl Quantifiable for CreditLink
{
	fn total_memory(&self) -> usize
	{
		size_of::<CreditLink>()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}
