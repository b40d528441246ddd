/*!
tornoc
=====

A cycle-accurate simulator of k-ary n-cube (torus) networks-on-chip with virtual-channel flow control.

The crate models the per-router micro-architecture of such a network: per-inport virtual channel buffers, a routing unit offering deterministic and adaptive algorithms, a two-stage separable switch allocator with credit-checked eligibility, a crossbar, and credit-based back-pressure over cycle-delayed links. The host simulator is expected to provide configuration values, inject messages at the network interfaces, and consume what comes out; scheduling is cycle-granular and fully deterministic under a fixed seed.

# Usage

This crate is `tornoc`. To use it add `tornoc` to your dependencies in your project's `Cargo.toml`.

```toml
[dependencies]
tornoc = "0.1"
```

A simulation is built from a `Configuration` value and run for a fixed number of cycles:

```ignore
Configuration
{
	random_seed: 42,
	cycles: 1000,
	num_ary: 3,//routers per dimension
	num_dim: 2,//dimensions of the torus
	vc_per_vnet: 4,
	routing_algorithm: "DETERMINISTIC",//or TABLE, XY, STATIC_ADAPTIVE, DYNAMIC_ADAPTIVE
	pick_algorithm: "MINIMUM_CONGESTION",//or STRAIGHT_LINES, RANDOM
	dr_lim: 1,//dimension reversals before the escape channels
	misrouting_lim: 0,//hops off the minimal paths
	injections: [
		//A scripted producer; hosts may instead call Simulation::inject_message.
		Injection { source: 0, destination: 4, vnet: 0, size: 256, cycle: 0 },
	],
}
```

The results come back as a `Result` configuration object; see the `measures` module for the fields.

*/

pub use quantifiable_derive::Quantifiable;//the derive macro

pub mod config;
pub mod error;
pub mod quantify;
pub mod event;
pub mod flit;
pub mod topology;
pub mod link;
pub mod router;
pub mod interface;
pub mod network;
pub mod measures;

use std::mem::size_of;
use std::rc::Rc;

use ::rand::{rngs::StdRng,SeedableRng};

use config::ConfigurationValue;
use event::{Event,EventQueue,Time};
use measures::Statistics;
use network::{Network,NetworkParameters};
use quantify::Quantifiable;

///An application message, broken into flits at the source interface and reassembled at the destination.
#[derive(Debug)]
pub struct Message
{
	///Node that created the message.
	pub origin: usize,
	///Every node that may consume the message.
	pub destinations: Vec<usize>,
	///The virtual network it travels on.
	pub vnet: usize,
	///Size in bits.
	pub size: usize,
	///Cycle when the message was created.
	pub creation_cycle: Time,
	///Whatever the protocol above wants to carry. The network does not look inside.
	pub payload: Vec<u8>,
}

impl Quantifiable for Message
{
	fn total_memory(&self) -> usize
	{
		size_of::<Message>() + self.destinations.capacity()*size_of::<usize>() + self.payload.capacity()
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

///The object representing the whole simulation.
pub struct Simulation
{
	///The whole parsed configuration.
	#[allow(dead_code)]
	pub configuration: ConfigurationValue,
	///The seed of the random number generator.
	#[allow(dead_code)]
	pub seed: u64,
	///The random number generator itself, with its current state.
	pub rng: StdRng,
	///Cycles to simulate.
	pub cycles: Time,
	///The instantiated network with its routers, interfaces and links.
	pub network: Network,
	///The queue of events guiding the simulation.
	pub event_queue: EventQueue,
	///The current cycle, i.e., the current discrete time.
	pub cycle: Time,
	///The statistics being collected.
	pub statistics: Statistics,
}

impl Simulation
{
	pub fn new(cv:&ConfigurationValue) -> Simulation
	{
		let params=Rc::new(NetworkParameters::new(cv));
		let mut seed=None;
		let mut cycles=None;
		let mut injections:Vec<(Time,Rc<Message>)>=vec![];
		if let &ConfigurationValue::Object(ref cv_name,ref cv_pairs)=cv
		{
			if cv_name!="Configuration"
			{
				panic!("A simulation must be created from a `Configuration` object not `{}`",cv_name);
			}
			for &(ref name,ref value) in cv_pairs
			{
				match name.as_ref()
				{
					"random_seed" => seed=Some(value.as_time().expect("bad value for random_seed")),
					"cycles" => cycles=Some(value.as_time().expect("bad value for cycles")),
					"injections" => for injection in value.as_array().expect("bad value for injections")
					{
						injections.push(Simulation::parse_injection(injection));
					},
					//The network parameters were consumed above.
					_ => (),
				}
			}
		}
		else
		{
			panic!("Trying to create a Simulation from a non-Object");
		}
		let seed=seed.expect("There were no random_seed");
		let cycles=cycles.expect("There were no cycles");
		let rng=StdRng::seed_from_u64(seed);
		let mut network=Network::new(params.clone());
		let statistics=Statistics::new(params.virtual_networks,params.num_routers);
		let horizon=cycles as usize + 2*(params.link_latency+params.ext_link_latency+params.bridge_delay) as usize + 8;
		let mut event_queue=EventQueue::new(horizon);
		//Stable by cycle so that each per-vnet queue is chronological and insertion order breaks ties.
		injections.sort_by_key(|&(cycle,_)|cycle);
		for (cycle,message) in injections
		{
			let origin=message.origin;
			network.interfaces[origin].queue_message(message);
			if let Some(generation)=network.interfaces[origin].schedule_process(0,cycle)
			{
				event_queue.enqueue(generation);
			}
		}
		Simulation{
			configuration: cv.clone(),
			seed,
			rng,
			cycles,
			network,
			event_queue,
			cycle: 0,
			statistics,
		}
	}
	fn parse_injection(cv:&ConfigurationValue) -> (Time,Rc<Message>)
	{
		let mut source=None;
		let mut destination=None;
		let mut vnet=0;
		let mut size=None;
		let mut cycle=0;
		match_object_panic!(cv,"Injection",value,
			"source" => source=Some(value.as_usize().expect("bad value for source")),
			"destination" => destination=Some(value.as_usize().expect("bad value for destination")),
			"vnet" => vnet=value.as_usize().expect("bad value for vnet"),
			"size" => size=Some(value.as_usize().expect("bad value for size")),
			"cycle" => cycle=value.as_time().expect("bad value for cycle"),
		);
		let origin=source.expect("There were no source");
		let destination=destination.expect("There were no destination");
		let size=size.expect("There were no size");
		(cycle,Rc::new(Message{
			origin,
			destinations: vec![destination],
			vnet,
			size,
			creation_cycle: cycle,
			payload: vec![],
		}))
	}
	///Hand a message to its source interface, to be flitisized as soon as a channel of its vnet frees.
	pub fn inject_message(&mut self, message:Message)
	{
		let origin=message.origin;
		let cycle=self.cycle.max(message.creation_cycle);
		self.network.interfaces[origin].queue_message(Rc::new(message));
		if let Some(generation)=self.network.interfaces[origin].schedule_process(self.cycle,cycle-self.cycle)
		{
			self.event_queue.enqueue(generation);
		}
	}
	///Run the simulation until its last cycle.
	pub fn run(&mut self)
	{
		while self.cycle<self.cycles
		{
			self.advance();
		}
	}
	///Execute a single cycle of the simulation: deliveries first, processing afterwards.
	fn advance(&mut self)
	{
		loop
		{
			let batch=self.event_queue.take_begin();
			if batch.is_empty()
			{
				break;
			}
			for event in batch
			{
				self.process_begin_event(event);
			}
		}
		loop
		{
			let batch=self.event_queue.take_end();
			if batch.is_empty()
			{
				break;
			}
			for event in batch
			{
				self.process_end_event(event);
			}
		}
		self.event_queue.advance();
		self.cycle+=1;
	}
	fn process_begin_event(&mut self, event:Event)
	{
		let generated=match event
		{
			Event::FlitToRouter{flit,router,port} => self.network.routers[router].insert_flit(self.cycle,port,flit,&mut self.rng),
			Event::FlitToInterface{flit,interface} => self.network.interfaces[interface].receive_flit(self.cycle,flit,&mut self.statistics),
			Event::CreditToRouter{credit,router,port} => self.network.routers[router].process_credit(self.cycle,port,credit),
			Event::CreditToInterface{credit,interface} => self.network.interfaces[interface].process_credit(self.cycle,credit),
			Event::LinkTransfer{link} => self.network.link_transfer(link,self.cycle),
			Event::CreditLinkTransfer{link} => self.network.credit_link_transfer(link,self.cycle),
			Event::ProcessRouter{..} | Event::ProcessInterface{..} => panic!("processing events should not arrive at the begin of a cycle"),
		};
		for generation in generated
		{
			self.event_queue.enqueue(generation);
		}
	}
	fn process_end_event(&mut self, event:Event)
	{
		let generated=match event
		{
			Event::ProcessRouter{router} => self.network.routers[router].process(self.cycle),
			Event::ProcessInterface{interface} => self.network.process_interface(interface,self.cycle,&mut self.statistics),
			_ => panic!("delivery events should not arrive at the end of a cycle"),
		};
		for generation in generated
		{
			self.event_queue.enqueue(generation);
		}
	}
	///The `Result` object with everything measured so far.
	pub fn get_simulation_results(&self) -> ConfigurationValue
	{
		self.statistics.collate(&self.network,self.cycle)
	}
	///Messages already delivered at the given node, in delivery order.
	pub fn received_messages(&self, node:usize) -> impl Iterator<Item=&Rc<Message>>
	{
		self.network.interfaces[node].received_messages.iter()
	}
}

impl Quantifiable for Simulation
{
	fn total_memory(&self) -> usize
	{
		size_of::<Simulation>() + self.network.total_memory() + self.event_queue.total_memory() + self.statistics.total_memory()
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
