/*!

Output port and virtual channel class selection.

Five algorithms are provided. `TABLE` consults the per-vnet routing table built with the topology. `XY` is the reference dimension-order routing for meshes. `DETERMINISTIC` walks the torus dimensions in ascending order, with the two-class dateline partition of the channels breaking cyclic dependencies. `STATIC_ADAPTIVE` and `DYNAMIC_ADAPTIVE` may take any profitable dimension, bounded by the dimension-reversal and misrouting counters, falling back to the deterministic escape channels when out of adaptive candidates.

The adaptive algorithms may allocate the downstream channel right here, recording the packet at the head of the channel's waiting queue, or line the packet up behind the current holder; the grant then arrives later through the credit wake-up of the output unit.

*/

use std::collections::BTreeMap;
use std::mem::size_of;

use ::rand::{Rng,rngs::StdRng};
use itertools::Itertools;

use crate::error::{Error,SourceLocation};
use crate::error;
use crate::source_location;
use crate::event::Time;
use crate::flit::{Flit,RouteInfo};
use crate::network::{RoutingAlgorithm,PickAlgorithm};
use crate::quantify::Quantifiable;
use crate::router::Router;
use crate::topology::{AxisSign,PortDirection,ring_delta};

pub struct RoutingUnit
{
	///For each vnet, for each outport, the destination nodes reachable through it.
	pub routing_table: Vec<Vec<Vec<usize>>>,
	///Tie-breaking weight of each outport for the table algorithm.
	pub weight_table: Vec<i32>,
	pub outports_dirn2idx: BTreeMap<PortDirection,usize>,
}

///Parallel vectors describing the adaptive candidates of a head flit, as handled by the pick algorithms.
struct AdaptiveCandidates
{
	dims: Vec<usize>,
	outports: Vec<usize>,
	classes: Vec<usize>,
	minimal: Vec<bool>,
}

///How a pick algorithm is scoring: towards a free channel or towards the best queue to wait in.
#[derive(Clone,Copy,PartialEq,Eq)]
enum PickMode
{
	Free,
	Wait,
}

impl RoutingUnit
{
	pub fn new() -> RoutingUnit
	{
		RoutingUnit{
			routing_table: vec![],
			weight_table: vec![],
			outports_dirn2idx: BTreeMap::new(),
		}
	}
	pub fn add_out_direction(&mut self, direction:PortDirection, outport:usize)
	{
		self.outports_dirn2idx.insert(direction,outport);
	}
	///Append the reachability sets of the next outport, one per vnet. Must be called in outport order.
	pub fn add_route(&mut self, entry:Vec<Vec<usize>>)
	{
		if self.routing_table.len()<entry.len()
		{
			self.routing_table.resize_with(entry.len(),Vec::new);
		}
		for (vnet,dests) in entry.into_iter().enumerate()
		{
			self.routing_table[vnet].push(dests);
		}
	}
	pub fn add_weight(&mut self, weight:i32)
	{
		self.weight_table.push(weight);
	}
	pub fn outport_by_direction(&self, direction:PortDirection) -> usize
	{
		match self.outports_dirn2idx.get(&direction)
		{
			Some(&outport) => outport,
			None => panic!("no outport in direction {}",direction),
		}
	}
}

impl Router
{
	///Decide outport and channel class for a head flit arriving on `(inport,invc)`.
	///Under the adaptive algorithms this may also grant the downstream channel and touch the waiting queues.
	pub fn route_flit(&mut self, current_cycle:Time, inport:usize, invc:usize, flit:&Flit, rng:&mut StdRng) -> Result<(usize,usize),Error>
	{
		let route=&flit.route;
		if route.dest_router==self.index
		{
			//Several interfaces may hang from this router, all through ports pointing Local; the table tells them apart.
			let outport=self.lookup_routing_table(route.vnet,&route.dest_nodes,rng)?;
			return Ok((outport,0));
		}
		match self.params.routing_algorithm
		{
			RoutingAlgorithm::Table =>
			{
				let outport=self.lookup_routing_table(route.vnet,&route.dest_nodes,rng)?;
				Ok((outport,0))
			},
			RoutingAlgorithm::Xy => Ok((self.route_xy(route,self.input_units[inport].direction),0)),
			RoutingAlgorithm::Deterministic => Ok(self.route_deterministic(route,self.input_units[inport].direction)),
			RoutingAlgorithm::StaticAdaptive => self.route_adaptive(current_cycle,inport,invc,flit,RoutingAlgorithm::StaticAdaptive,rng),
			RoutingAlgorithm::DynamicAdaptive => self.route_adaptive(current_cycle,inport,invc,flit,RoutingAlgorithm::DynamicAdaptive,rng),
		}
	}
	///Gather the outports whose reachability set intersects the destination set at minimum weight.
	///On ordered vnets the first is taken, so that all the packets of a flow follow the same way; otherwise one is taken uniformly.
	pub fn lookup_routing_table(&self, vnet:usize, dest_nodes:&[usize], rng:&mut StdRng) -> Result<usize,Error>
	{
		let table=&self.routing_unit.routing_table[vnet];
		let weights=&self.routing_unit.weight_table;
		let mut min_weight=i32::MAX;
		for (outport,dests) in table.iter().enumerate()
		{
			if dests.iter().any(|d|dest_nodes.contains(d)) && weights[outport]<=min_weight
			{
				min_weight=weights[outport];
			}
		}
		let candidates:Vec<usize>=table.iter().enumerate().filter_map(|(outport,dests)|{
			if weights[outport]==min_weight && dests.iter().any(|d|dest_nodes.contains(d))
			{
				Some(outport)
			}
			else
			{
				None
			}
		}).collect();
		if candidates.is_empty()
		{
			return Err(error!(no_route_towards_destination,self.index,dest_nodes.first().copied().unwrap_or(usize::MAX)));
		}
		let chosen=if self.params.is_vnet_ordered(vnet)
		{
			0
		}
		else
		{
			rng.gen_range(0..candidates.len())
		};
		Ok(candidates[chosen])
	}
	///Reference dimension-order routing on a mesh: first all the X way, then all the Y way.
	pub fn route_xy(&self, route:&RouteInfo, inport_dirn:PortDirection) -> usize
	{
		let num_cols=self.params.num_cols.expect("XY routing requires a mesh");
		let my_x=self.index%num_cols;
		let my_y=self.index/num_cols;
		let dest_x=route.dest_router%num_cols;
		let dest_y=route.dest_router/num_cols;
		let x_hops=(dest_x as i64-my_x as i64).abs();
		let y_hops=(dest_y as i64-my_y as i64).abs();
		assert!( !(x_hops==0 && y_hops==0) );
		let outport_dirn=if x_hops>0
		{
			if dest_x>=my_x
			{
				assert!( inport_dirn==PortDirection::Local || inport_dirn==PortDirection::West );
				PortDirection::East
			}
			else
			{
				assert!( inport_dirn==PortDirection::Local || inport_dirn==PortDirection::East );
				PortDirection::West
			}
		}
		else
		{
			if dest_y>=my_y
			{
				assert!( inport_dirn!=PortDirection::North );
				PortDirection::North
			}
			else
			{
				assert!( inport_dirn!=PortDirection::South );
				PortDirection::South
			}
		};
		self.routing_unit.outport_by_direction(outport_dirn)
	}
	///Dimension-order routing for the torus.
	///Resumes at the arrival dimension and takes the shorter way around the ring; the channel class applies the dateline rule.
	pub fn route_deterministic(&self, route:&RouteInfo, inport_dirn:PortDirection) -> (usize,usize)
	{
		let cartesian=&self.params.cartesian;
		let num_dim=self.params.num_dim;
		let my_id=self.index;
		let dest_id=route.dest_router;
		assert!( my_id!=dest_id );
		let start=inport_dirn.dimension().unwrap_or(0);
		let dim=(0..num_dim).map(|offset|(start+offset)%num_dim)
			.find(|&i|cartesian.digit(my_id,i)!=cartesian.digit(dest_id,i))
			.expect("routing a flit that is already at its destination router");
		let my_digit=cartesian.digit(my_id,dim);
		let dest_digit=cartesian.digit(dest_id,dim);
		let sign=if ring_delta(my_digit,dest_digit,self.params.num_ary)>0 { AxisSign::Upper } else { AxisSign::Lower };
		let outport=self.routing_unit.outport_by_direction(PortDirection::Axis{dimension:dim,sign});
		let class=if my_digit>dest_digit || my_digit==0 { 0 } else { 1 };
		(outport,class)
	}
	///Enumerate the legal adaptive candidates of a head flit, one entry per permitted (dimension, way).
	///The channel class is `3*level+alpha` with the level tracking the dimension-reversal count the flit will have on the link, so that a reversal drops the packet one escape level.
	fn adaptive_candidates(&self, inport:usize, flit:&Flit, algorithm:RoutingAlgorithm) -> AdaptiveCandidates
	{
		let params=&self.params;
		let cartesian=&params.cartesian;
		let my_id=self.index;
		let dest_id=flit.route.dest_router;
		let dr=flit.route.dr;
		let dr_lim=params.dr_lim;
		let cur_dim=self.input_units[inport].direction.dimension();
		let mut candidates=AdaptiveCandidates{ dims:vec![], outports:vec![], classes:vec![], minimal:vec![] };
		if dr>=dr_lim
		{
			return candidates;
		}
		for i in 0..params.num_dim
		{
			let reversing=matches!(cur_dim,Some(d) if i<d);
			if reversing && dr+1>=dr_lim
			{
				continue;
			}
			let my_digit=cartesian.digit(my_id,i);
			let dest_digit=cartesian.digit(dest_id,i);
			let alpha=match cur_dim
			{
				Some(d) if d==i => if my_digit>dest_digit || my_digit==0 { 0 } else { 1 },
				_ => 2,
			};
			let effective_dr=dr+if reversing {1} else {0};
			let level=match algorithm
			{
				RoutingAlgorithm::DynamicAdaptive => if effective_dr==0 {0} else {1},
				_ => effective_dr as usize,
			};
			let class=3*level+alpha;
			let mut push=|sign:AxisSign,minimal:bool|
			{
				candidates.dims.push(i);
				candidates.outports.push(self.routing_unit.outport_by_direction(PortDirection::Axis{dimension:i,sign}));
				candidates.classes.push(class);
				candidates.minimal.push(minimal);
			};
			if my_digit!=dest_digit
			{
				let min_sign=if ring_delta(my_digit,dest_digit,params.num_ary)>0 { AxisSign::Upper } else { AxisSign::Lower };
				push(min_sign,true);
				if flit.route.misrouting<params.misrouting_lim && cur_dim!=Some(i)
				{
					push(min_sign.reverse(),false);
				}
			}
			else if flit.route.misrouting<params.misrouting_lim && cur_dim!=Some(i)
			{
				push(AxisSign::Upper,false);
				push(AxisSign::Lower,false);
			}
		}
		candidates
	}
	///The adaptive route computation.
	///Prefer a minimal candidate with a channel free right now; else line up on the best legal candidate; else escape through the deterministic channels.
	fn route_adaptive(&mut self, current_cycle:Time, inport:usize, invc:usize, flit:&Flit, algorithm:RoutingAlgorithm, rng:&mut StdRng) -> Result<(usize,usize),Error>
	{
		let params=self.params.clone();
		let vnet=flit.vnet;
		let dr=flit.route.dr;
		let candidates=self.adaptive_candidates(inport,flit,algorithm);
		let legal:Vec<usize>=(0..candidates.dims.len()).filter(|&idx|{
			let span=params.vc_span(vnet,candidates.classes[idx]);
			self.output_units[candidates.outports[idx]].has_legal_vc(span,dr,algorithm)
		}).collect();
		if legal.is_empty()
		{
			//Out of adaptive freedom: escape through the deterministic channels of the last level.
			let (outport,det_class)=self.route_deterministic(&flit.route,self.input_units[inport].direction);
			let class=3*params.adaptive_levels()+det_class;
			return Ok((outport,class));
		}
		let cur_dim=self.input_units[inport].direction.dimension();
		let free_minimal:Vec<usize>=legal.iter().copied().filter(|&idx|{
			let span=params.vc_span(vnet,candidates.classes[idx]);
			candidates.minimal[idx] && self.output_units[candidates.outports[idx]].has_free_vc(span)
		}).collect();
		if !free_minimal.is_empty()
		{
			let chosen=self.pick_candidate(&free_minimal,&candidates,cur_dim,vnet,PickMode::Free,dr,algorithm,rng);
			let outport=candidates.outports[chosen];
			let class=candidates.classes[chosen];
			let span=params.vc_span(vnet,class);
			let vc=self.output_units[outport].select_free_vc(span,current_cycle).expect("a free channel was just seen");
			self.input_units[inport].grant_outvc(invc,vc);
			self.output_units[outport].enqueue_waiting_queue(vc,inport,invc,dr);
			return Ok((outport,class));
		}
		let chosen=self.pick_candidate(&legal,&candidates,cur_dim,vnet,PickMode::Wait,dr,algorithm,rng);
		let outport=candidates.outports[chosen];
		let class=candidates.classes[chosen];
		let span=params.vc_span(vnet,class);
		match self.output_units[outport].select_free_vc(span.clone(),current_cycle)
		{
			Some(vc) =>
			{
				self.input_units[inport].grant_outvc(invc,vc);
				self.output_units[outport].enqueue_waiting_queue(vc,inport,invc,dr);
			},
			None =>
			{
				//Wait behind the holder; the credit wake-up will grant the channel when it frees.
				let vc=self.output_units[outport].select_legal_vc(span,dr,algorithm).expect("filtered for legality");
				self.output_units[outport].enqueue_waiting_queue(vc,inport,invc,dr);
			},
		}
		Ok((outport,class))
	}
	///Run the configured pick algorithm over the candidate indices in `set`.
	fn pick_candidate(&self, set:&[usize], candidates:&AdaptiveCandidates, cur_dim:Option<usize>, vnet:usize, mode:PickMode, dr:u32, algorithm:RoutingAlgorithm, rng:&mut StdRng) -> usize
	{
		assert!( !set.is_empty() );
		let best:Vec<usize>=match self.params.pick_algorithm
		{
			PickAlgorithm::MinimumCongestion =>
			{
				match mode
				{
					//The most free channels downstream.
					PickMode::Free => set.iter().copied().max_set_by_key(|&idx|{
						let span=self.params.vc_span(vnet,candidates.classes[idx]);
						self.output_units[candidates.outports[idx]].get_free_vc_count(span)
					}),
					//The shortest queue to wait in.
					PickMode::Wait => set.iter().copied().min_set_by_key(|&idx|{
						let span=self.params.vc_span(vnet,candidates.classes[idx]);
						self.output_units[candidates.outports[idx]].get_min_waiting_length(span,dr,algorithm)
					}),
				}
			},
			PickAlgorithm::StraightLines =>
			{
				set.iter().copied().min_set_by_key(|&idx|match cur_dim
				{
					Some(d) => (candidates.dims[idx] as i64-d as i64).abs(),
					None => 0,
				})
			},
			PickAlgorithm::Random => set.to_vec(),
		};
		best[rng.gen_range(0..best.len())]
	}
}

impl Quantifiable for RoutingUnit
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<RoutingUnit>();
		for per_vnet in self.routing_table.iter()
		{
			for dests in per_vnet.iter()
			{
				total+=size_of::<Vec<usize>>()+dests.capacity()*size_of::<usize>();
			}
		}
		total+=self.weight_table.capacity()*size_of::<i32>();
		total+=self.outports_dirn2idx.len()*size_of::<(PortDirection,usize)>();
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
