/*!

The two-stage separable switch allocation.

SA-I selects at most one requesting virtual channel per inport, round-robin. SA-II selects at most one requesting inport per outport, round-robin, granting the crossbar path. Heads without a downstream channel get one here, except under the adaptive algorithms, whose heads in adaptive classes must have received their channel from the routing unit or a credit wake-up; only escape-level heads are allocated at this stage.

Both round-robin pointers advance only past winners, which keeps the arbitration fair.

*/

use std::mem::size_of;

use crate::event::{Time,EventGeneration};
use crate::flit::Stage;
use crate::network::RoutingAlgorithm;
use crate::quantify::Quantifiable;
use crate::router::Router;

pub struct SwitchAllocator
{
	///Per inport, the first virtual channel to consider in SA-I.
	pub round_robin_invc: Vec<usize>,
	///Per outport, the first inport to consider in SA-II.
	pub round_robin_inport: Vec<usize>,
	///Per inport, the outport requested in SA-I this cycle.
	pub port_requests: Vec<Option<usize>>,
	///Per inport, the virtual channel that made the request.
	pub vc_winners: Vec<usize>,
	pub input_arbiter_activity: u64,
	pub output_arbiter_activity: u64,
}

impl SwitchAllocator
{
	pub fn new() -> SwitchAllocator
	{
		SwitchAllocator{
			round_robin_invc: vec![],
			round_robin_inport: vec![],
			port_requests: vec![],
			vc_winners: vec![],
			input_arbiter_activity: 0,
			output_arbiter_activity: 0,
		}
	}
	pub fn initialize(&mut self, num_inports:usize, num_outports:usize)
	{
		self.round_robin_invc=vec![0;num_inports];
		self.round_robin_inport=vec![0;num_outports];
		self.port_requests=vec![None;num_inports];
		self.vc_winners=vec![0;num_inports];
	}
}

impl Router
{
	///SA-I: at each inport, the first eligible virtual channel in round-robin order places a request for its outport.
	pub fn arbitrate_inports(&mut self, current_cycle:Time)
	{
		let num_vcs=self.params.num_vcs();
		for inport in 0..self.input_units.len()
		{
			let mut invc=self.switch_allocator.round_robin_invc[inport];
			for _ in 0..num_vcs
			{
				if self.input_units[inport].need_stage(invc,Stage::SwitchAllocation,current_cycle)
				{
					let outport=self.input_units[inport].get_outport(invc).expect("a flit awaits allocation without an output port");
					let outvc=self.input_units[inport].get_outvc(invc);
					if self.send_allowed(current_cycle,inport,invc,outport,outvc)
					{
						self.switch_allocator.input_arbiter_activity+=1;
						self.switch_allocator.port_requests[inport]=Some(outport);
						self.switch_allocator.vc_winners[inport]=invc;
						break;
					}
				}
				invc=(invc+1)%num_vcs;
			}
		}
	}
	///SA-II: at each outport, the first requesting inport in round-robin order is granted.
	///The winning flit is read out of its lane, stamped, charged a credit, and handed to the crossbar; a credit travels back upstream.
	pub fn arbitrate_outports(&mut self, current_cycle:Time) -> Vec<EventGeneration>
	{
		let mut events=vec![];
		let num_inports=self.input_units.len();
		for outport in 0..self.output_units.len()
		{
			let mut inport=self.switch_allocator.round_robin_inport[outport];
			for _ in 0..num_inports
			{
				if self.switch_allocator.port_requests[inport]==Some(outport)
				{
					let invc=self.switch_allocator.vc_winners[inport];
					let outvc=match self.input_units[inport].get_outvc(invc)
					{
						Some(vc) => vc,
						//Simplified channel allocation: any free channel of the class, guaranteed by the SA-I check.
						None => self.vc_allocate(current_cycle,outport,inport,invc),
					};
					let mut flit=self.input_units[inport].get_top_flit(invc).expect("the winner lane is empty");
					flit.outport=Some(outport);
					flit.vc=Some(outvc);
					if self.is_dimension_reversal(inport,outport)
					{
						flit.route.dr+=1;
					}
					if self.is_misrouting(inport,outport,flit.route.dest_router)
					{
						flit.route.misrouting+=1;
					}
					self.output_units[outport].decrement_credit(outvc);
					flit.advance_stage(Stage::SwitchTraversal,current_cycle);
					let flit_type=flit.flit_type;
					self.crossbar.switch_buffers[inport].insert(flit);
					self.switch_allocator.output_arbiter_activity+=1;
					if flit_type.is_tail()
					{
						//The lane holds one packet at a time, so it must now be empty.
						assert!( self.input_units[inport].vcs[invc].buffer.is_empty() );
						self.input_units[inport].set_vc_idle(invc,current_cycle);
						events.extend(self.input_units[inport].increment_credit(invc,true,current_cycle));
					}
					else
					{
						events.extend(self.input_units[inport].increment_credit(invc,false,current_cycle));
					}
					self.switch_allocator.port_requests[inport]=None;
					self.switch_allocator.round_robin_inport[outport]=(inport+1)%num_inports;
					//Only the lane that got the switch advances the pointer, to keep it fair.
					self.switch_allocator.round_robin_invc[inport]=(invc+1)%self.params.num_vcs();
					break;
				}
				inport=(inport+1)%num_inports;
			}
		}
		events
	}
	///Whether the flit heading `(inport,invc)` to `(outport,outvc)` may be sent this cycle.
	///Checks channel availability, credits, point-to-point ordering on ordered vnets, and the adaptive level gate.
	pub fn send_allowed(&self, current_cycle:Time, inport:usize, invc:usize, outport:usize, outvc:Option<usize>) -> bool
	{
		let params=&self.params;
		let vnet=self.get_vnet(invc);
		let mut has_outvc=outvc.is_some();
		let mut has_credit=false;
		let output_unit=&self.output_units[outport];
		match outvc
		{
			Some(vc) => has_credit=output_unit.has_credit(vc),
			None =>
			{
				//Only heads reach here.
				let outvc_class=self.input_units[inport].get_outvc_class(invc).expect("a head awaits allocation without a channel class");
				if params.routing_algorithm==RoutingAlgorithm::StaticAdaptive || params.routing_algorithm==RoutingAlgorithm::DynamicAdaptive
				{
					//A head in an adaptive class cannot hop into an escape channel it was not routed into;
					//its grant can only come from the routing unit or a reactivation.
					if !output_unit.direction.is_local() && outvc_class/3!=params.adaptive_levels()
					{
						return false;
					}
				}
				if output_unit.has_free_vc(params.vc_span(vnet,outvc_class))
				{
					has_outvc=true;
					//Each channel has at least one buffer, so no further credit check is needed.
					has_credit=true;
				}
			},
		}
		if !has_outvc || !has_credit
		{
			return false;
		}
		if params.is_vnet_ordered(vnet)
		{
			let enqueue_time=self.input_units[inport].get_enqueue_time(invc);
			let vc_base=vnet*params.vc_per_vnet;
			for vc_offset in 0..params.vc_per_vnet
			{
				let other=vc_base+vc_offset;
				if self.input_units[inport].need_stage(other,Stage::SwitchAllocation,current_cycle)
					&& self.input_units[inport].get_outport(other)==Some(outport)
					&& self.input_units[inport].get_enqueue_time(other)<enqueue_time
				{
					return false;
				}
			}
		}
		true
	}
	///Assign a free channel of the head's class to the winner of the output port.
	fn vc_allocate(&mut self, current_cycle:Time, outport:usize, inport:usize, invc:usize) -> usize
	{
		let outvc_class=self.input_units[inport].get_outvc_class(invc).expect("a head awaits allocation without a channel class");
		let span=self.params.vc_span(self.get_vnet(invc),outvc_class);
		//It has to find a channel since SA-I checked availability.
		let outvc=self.output_units[outport].select_free_vc(span,current_cycle).expect("no free channel after the eligibility check");
		self.input_units[inport].grant_outvc(invc,outvc);
		outvc
	}
	///Clear the request vector at the end of the allocation cycle. It was populated by SA-I.
	pub fn clear_request_vector(&mut self)
	{
		for request in self.switch_allocator.port_requests.iter_mut()
		{
			*request=None;
		}
	}
}

impl Quantifiable for SwitchAllocator
{
	fn total_memory(&self) -> usize
	{
		size_of::<SwitchAllocator>()
			+ self.round_robin_invc.capacity()*size_of::<usize>()
			+ self.round_robin_inport.capacity()*size_of::<usize>()
			+ self.port_requests.capacity()*size_of::<Option<usize>>()
			+ self.vc_winners.capacity()*size_of::<usize>()
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
