/*!

The per-router micro-architecture.

A `Router` owns one `InputUnit` per inport, one `OutputUnit` per outport, a `RoutingUnit`, a `SwitchAllocator` and a `CrossbarSwitch`. Every cycle in which it has work it wakes up at the end of the cycle and performs the two-stage separable switch allocation followed by the crossbar traversal. Flit and credit arrivals are delivered at the beginning of the cycle by the event loop.

*/

pub mod input_unit;
pub mod output_unit;
pub mod routing_unit;
pub mod switch_allocator;
pub mod crossbar;

use std::mem::size_of;
use std::rc::Rc;

use ::rand::rngs::StdRng;

use crate::event::{Time,Event,EventGeneration,CyclePosition};
use crate::flit::{Flit,Credit,Stage};
use crate::network::NetworkParameters;
use crate::quantify::Quantifiable;
use crate::topology::PortDirection;

use self::input_unit::InputUnit;
use self::output_unit::OutputUnit;
use self::routing_unit::RoutingUnit;
use self::switch_allocator::SwitchAllocator;
use self::crossbar::CrossbarSwitch;

///Whether a virtual channel is currently assigned to a packet.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum VcState
{
	Idle,
	Active,
}

pub struct Router
{
	///The index of the router in the network.
	pub index: usize,
	pub params: Rc<NetworkParameters>,
	pub input_units: Vec<InputUnit>,
	pub output_units: Vec<OutputUnit>,
	pub routing_unit: RoutingUnit,
	pub switch_allocator: SwitchAllocator,
	pub crossbar: CrossbarSwitch,
	///The cycle for which a `ProcessRouter` event is already enqueued, if any.
	pub pending_process: Option<Time>,
}

impl Router
{
	pub fn new(index:usize, params:Rc<NetworkParameters>) -> Router
	{
		Router{
			index,
			params,
			input_units: vec![],
			output_units: vec![],
			routing_unit: RoutingUnit::new(),
			switch_allocator: SwitchAllocator::new(),
			crossbar: CrossbarSwitch::new(),
			pending_process: None,
		}
	}
	///Register an inport fed by some link, with the credit link going back to the sender.
	pub fn add_in_port(&mut self, direction:PortDirection, credit_link:usize)
	{
		let id=self.input_units.len();
		self.input_units.push(InputUnit::new(id,direction,credit_link,self.params.clone()));
		self.crossbar.add_inport();
	}
	///Register an outport with its network link and the credit link coming back from the receiver.
	pub fn add_out_port(&mut self, direction:PortDirection, out_link:usize, credit_link:usize)
	{
		let id=self.output_units.len();
		self.output_units.push(OutputUnit::new(id,direction,out_link,credit_link,self.params.clone()));
		self.routing_unit.add_out_direction(direction,id);
	}
	///Called once all the ports have been registered.
	pub fn initialize(&mut self)
	{
		self.switch_allocator.initialize(self.input_units.len(),self.output_units.len());
	}
	pub fn num_inports(&self) -> usize
	{
		self.input_units.len()
	}
	pub fn num_outports(&self) -> usize
	{
		self.output_units.len()
	}
	///Request a `ProcessRouter` event at `current_cycle+delay` unless one at that cycle or earlier is already enqueued.
	///An earlier wakeup chains to later ones through `check_for_wakeup`.
	pub fn schedule_process(&mut self, current_cycle:Time, delay:Time) -> Option<EventGeneration>
	{
		let target=current_cycle+delay;
		match self.pending_process
		{
			Some(cycle) if cycle<=target => None,
			_ =>
			{
				self.pending_process=Some(target);
				Some(EventGeneration{
					delay,
					position: CyclePosition::End,
					event: Event::ProcessRouter{router:self.index},
				})
			}
		}
	}
	///A flit is delivered into an inport at the beginning of a cycle.
	///For heads this runs the routing unit; everything advances to the switch allocation stage of the next cycle.
	pub fn insert_flit(&mut self, current_cycle:Time, port:usize, mut flit:Flit, rng:&mut StdRng) -> Vec<EventGeneration>
	{
		let invc=flit.vc.expect("a flit arrived to a router without a virtual channel");
		if flit.flit_type.is_head()
		{
			self.input_units[port].begin_packet(invc,current_cycle);
			let (outport,outvc_class)=self.route_flit(current_cycle,port,invc,&flit,rng)
				.unwrap_or_else(|e|panic!("routing failed at router {}: {}",self.index,e));
			self.input_units[port].grant_outport(invc,outport);
			self.input_units[port].grant_outvc_class(invc,outvc_class);
		}
		else
		{
			assert_eq!( self.input_units[port].vcs[invc].state, VcState::Active, "a body flit arrived to an idle virtual channel" );
		}
		flit.advance_stage(Stage::SwitchAllocation,current_cycle+1);
		self.input_units[port].vcs[invc].buffer.insert(flit);
		self.schedule_process(current_cycle,1).into_iter().collect()
	}
	///A credit is delivered into an outport at the beginning of a cycle.
	///Free signals may reactivate the next entry of the waiting queue, granting it the freed channel.
	pub fn process_credit(&mut self, current_cycle:Time, port:usize, credit:Credit) -> Vec<EventGeneration>
	{
		let mut events=vec![];
		let reactivated={
			let output_unit=&mut self.output_units[port];
			output_unit.increment_credit(credit.vc);
			if credit.is_free_signal
			{
				output_unit.set_vc_idle(credit.vc,current_cycle);
				output_unit.waiting_queues[credit.vc].dequeue();
				match output_unit.waiting_queues[credit.vc].peek()
				{
					Some(waiter) =>
					{
						output_unit.set_vc_active(credit.vc,current_cycle);
						Some((waiter.inport,waiter.invc))
					},
					None => None,
				}
			}
			else
			{
				None
			}
		};
		if let Some((inport,invc))=reactivated
		{
			self.input_units[inport].grant_outvc(invc,credit.vc);
			//The reactivated head may win the switch this very cycle.
			events.extend(self.schedule_process(current_cycle,0));
		}
		events
	}
	///The per-cycle work: the two allocation stages, then the crossbar, then bookkeeping.
	pub fn process(&mut self, current_cycle:Time) -> Vec<EventGeneration>
	{
		//Rescheduling to an earlier cycle leaves the old event behind; it arrives stale and must do nothing,
		//or the allocator would run twice in one cycle.
		match self.pending_process
		{
			Some(cycle) if cycle==current_cycle => self.pending_process=None,
			_ => return vec![],
		}
		let mut events=vec![];
		self.arbitrate_inports(current_cycle);
		events.extend(self.arbitrate_outports(current_cycle));
		events.extend(self.crossbar_pass(current_cycle));
		self.clear_request_vector();
		events.extend(self.check_for_wakeup(current_cycle));
		events
	}
	///Reschedule for the next cycle iff some virtual channel still has a flit awaiting switch allocation.
	pub fn check_for_wakeup(&mut self, current_cycle:Time) -> Option<EventGeneration>
	{
		let needed=self.input_units.iter().any(|input_unit|
			input_unit.vcs.iter().any(|vc|
				match vc.buffer.peek_top_flit()
				{
					Some(flit) => flit.is_stage(Stage::SwitchAllocation,current_cycle+1),
					None => false,
				}
			)
		);
		if needed
		{
			self.schedule_process(current_cycle,1)
		}
		else
		{
			None
		}
	}
	///The vnet a virtual channel index belongs to.
	pub fn get_vnet(&self, vc:usize) -> usize
	{
		let vnet=vc/self.params.vc_per_vnet;
		assert!( vnet<self.params.virtual_networks );
		vnet
	}
	///Whether moving from `inport` to `outport` decreases the traversed dimension, which counts as a dimension reversal.
	pub fn is_dimension_reversal(&self, inport:usize, outport:usize) -> bool
	{
		let in_dim=self.input_units[inport].direction.dimension();
		let out_dim=self.output_units[outport].direction.dimension();
		match (in_dim,out_dim)
		{
			(Some(i),Some(o)) => i>o,
			_ => false,
		}
	}
	///Whether the traversal moves along a dimension whose digit already matches the destination, leaving every minimal path.
	pub fn is_misrouting(&self, inport:usize, outport:usize, dest_router:usize) -> bool
	{
		if self.input_units[inport].direction.is_local()
		{
			return false;
		}
		let out_dim=match self.output_units[outport].direction.dimension()
		{
			Some(d) => d,
			None => return false,
		};
		let cartesian=&self.params.cartesian;
		cartesian.digit(self.index,out_dim)==cartesian.digit(dest_router,out_dim)
	}
}

impl Quantifiable for Router
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<Router>();
		for input_unit in self.input_units.iter()
		{
			total+=input_unit.total_memory();
		}
		for output_unit in self.output_units.iter()
		{
			total+=output_unit.total_memory();
		}
		total+=self.routing_unit.total_memory();
		total+=self.switch_allocator.total_memory();
		total+=self.crossbar.total_memory();
		total
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
