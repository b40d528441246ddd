/*!

Module encapsulating the statistics about several measures.

The values collated into the `Result` object are:
* `cycle` is the last simulated cycle.
* `packets_injected`, `packets_received`, `flits_injected`, `flits_received` are per-vnet totals.
* `packet_network_latency` and `packet_queueing_latency` are per-vnet sums of cycles; the network part counts from flitisization to delivery, the queueing part from message creation to flitisization.
* `average_packet_network_latency`, `average_packet_queueing_latency`, and their sum `average_packet_latency` are averaged over the received packets of every vnet.
* `average_hops`, `average_drs`, `average_misrouting` are averaged over the received flits.
* `ext_in_link_utilization`, `ext_out_link_utilization`, `int_link_utilization` are total traversals per link kind.
* `average_link_utilization` adds up the per-link traversal rates; `average_vc_load` does so per virtual channel index.
* `data_traffic_distribution` and `ctrl_traffic_distribution` count received packets per (source,destination) pair, split by the vnet kind.
* `reception_rate` is received packets per node per cycle.

*/

use std::mem::size_of;

use crate::config::ConfigurationValue;
use crate::event::Time;
use crate::flit::Flit;
use crate::link::LinkType;
use crate::network::{Network,NetworkParameters,VnetType};
use crate::quantify::Quantifiable;

pub struct Statistics
{
	///The first cycle included in the measurements.
	pub begin_cycle: Time,
	pub packets_injected: Vec<u64>,
	pub packets_received: Vec<u64>,
	pub flits_injected: Vec<u64>,
	pub flits_received: Vec<u64>,
	pub packet_network_latency: Vec<u64>,
	pub packet_queueing_latency: Vec<u64>,
	pub total_hops: u64,
	pub total_drs: u64,
	pub total_misrouting: u64,
	pub data_traffic_distribution: Vec<Vec<u64>>,
	pub ctrl_traffic_distribution: Vec<Vec<u64>>,
}

impl Statistics
{
	pub fn new(virtual_networks:usize, num_routers:usize) -> Statistics
	{
		Statistics{
			begin_cycle: 0,
			packets_injected: vec![0;virtual_networks],
			packets_received: vec![0;virtual_networks],
			flits_injected: vec![0;virtual_networks],
			flits_received: vec![0;virtual_networks],
			packet_network_latency: vec![0;virtual_networks],
			packet_queueing_latency: vec![0;virtual_networks],
			total_hops: 0,
			total_drs: 0,
			total_misrouting: 0,
			data_traffic_distribution: vec![vec![0;num_routers];num_routers],
			ctrl_traffic_distribution: vec![vec![0;num_routers];num_routers],
		}
	}
	///Called when an interface flitisizes a message into a packet.
	pub fn track_injected_packet(&mut self, vnet:usize, num_flits:usize)
	{
		self.packets_injected[vnet]+=1;
		self.flits_injected[vnet]+=num_flits as u64;
	}
	///Called for every flit consumed by an interface.
	pub fn track_received_flit(&mut self, flit:&Flit)
	{
		self.flits_received[flit.vnet]+=1;
		self.total_hops+=flit.route.hops as u64;
		self.total_drs+=flit.route.dr as u64;
		self.total_misrouting+=flit.route.misrouting as u64;
	}
	///Called when the tail closes a packet at its destination interface.
	pub fn track_received_packet(&mut self, cycle:Time, flit:&Flit, params:&NetworkParameters)
	{
		let vnet=flit.vnet;
		self.packets_received[vnet]+=1;
		self.packet_network_latency[vnet]+=cycle-flit.enqueue_time;
		self.packet_queueing_latency[vnet]+=flit.queueing_delay;
		let distribution=match params.vnet_types[vnet]
		{
			VnetType::Data => &mut self.data_traffic_distribution,
			VnetType::Ctrl => &mut self.ctrl_traffic_distribution,
		};
		distribution[flit.route.src_router][flit.route.dest_router]+=1;
	}
	///Forget everything measured before `next_cycle`, as for a warm-up.
	pub fn reset(&mut self, next_cycle:Time)
	{
		let virtual_networks=self.packets_injected.len();
		let num_routers=self.data_traffic_distribution.len();
		*self=Statistics::new(virtual_networks,num_routers);
		self.begin_cycle=next_cycle;
	}
	///Build the `Result` object with everything measured.
	pub fn collate(&self, network:&Network, cycle:Time) -> ConfigurationValue
	{
		let time_delta=(cycle.saturating_sub(self.begin_cycle)) as f64;
		let received:u64=self.packets_received.iter().sum();
		let flits:u64=self.flits_received.iter().sum();
		let network_latency:u64=self.packet_network_latency.iter().sum();
		let queueing_latency:u64=self.packet_queueing_latency.iter().sum();
		let ratio=|num:u64,den:u64| if den==0 {0.0} else {num as f64/den as f64};
		let mut ext_in=0u64;
		let mut ext_out=0u64;
		let mut internal=0u64;
		let mut average_link_utilization=0.0;
		let mut average_vc_load=vec![0.0;network.params.num_vcs()];
		for link in network.links.iter()
		{
			match link.link_type
			{
				LinkType::ExtIn => ext_in+=link.utilization,
				LinkType::ExtOut => ext_out+=link.utilization,
				LinkType::Internal => internal+=link.utilization,
			}
			if time_delta>0.0
			{
				average_link_utilization+=link.utilization as f64/time_delta;
				for (vc,load) in link.vc_load.iter().enumerate()
				{
					average_vc_load[vc]+=*load as f64/time_delta;
				}
			}
		}
		let count_array=|values:&Vec<u64>| ConfigurationValue::Array(values.iter().map(|&x|ConfigurationValue::Number(x as f64)).collect());
		let matrix=|values:&Vec<Vec<u64>>| ConfigurationValue::Array(values.iter().map(count_array).collect());
		let average_packet_network_latency=ratio(network_latency,received);
		let average_packet_queueing_latency=ratio(queueing_latency,received);
		ConfigurationValue::Object("Result".to_string(),vec![
			("cycle".to_string(),ConfigurationValue::Number(cycle as f64)),
			("packets_injected".to_string(),count_array(&self.packets_injected)),
			("packets_received".to_string(),count_array(&self.packets_received)),
			("flits_injected".to_string(),count_array(&self.flits_injected)),
			("flits_received".to_string(),count_array(&self.flits_received)),
			("packet_network_latency".to_string(),count_array(&self.packet_network_latency)),
			("packet_queueing_latency".to_string(),count_array(&self.packet_queueing_latency)),
			("average_packet_network_latency".to_string(),ConfigurationValue::Number(average_packet_network_latency)),
			("average_packet_queueing_latency".to_string(),ConfigurationValue::Number(average_packet_queueing_latency)),
			("average_packet_latency".to_string(),ConfigurationValue::Number(average_packet_network_latency+average_packet_queueing_latency)),
			("average_hops".to_string(),ConfigurationValue::Number(ratio(self.total_hops,flits))),
			("average_drs".to_string(),ConfigurationValue::Number(ratio(self.total_drs,flits))),
			("average_misrouting".to_string(),ConfigurationValue::Number(ratio(self.total_misrouting,flits))),
			("ext_in_link_utilization".to_string(),ConfigurationValue::Number(ext_in as f64)),
			("ext_out_link_utilization".to_string(),ConfigurationValue::Number(ext_out as f64)),
			("int_link_utilization".to_string(),ConfigurationValue::Number(internal as f64)),
			("average_link_utilization".to_string(),ConfigurationValue::Number(average_link_utilization)),
			("average_vc_load".to_string(),ConfigurationValue::Array(average_vc_load.into_iter().map(ConfigurationValue::Number).collect())),
			("data_traffic_distribution".to_string(),matrix(&self.data_traffic_distribution)),
			("ctrl_traffic_distribution".to_string(),matrix(&self.ctrl_traffic_distribution)),
			("reception_rate".to_string(),ConfigurationValue::Number(if time_delta>0.0 { ratio(received,network.params.num_routers as u64)/time_delta } else {0.0})),
		])
	}
}

impl Quantifiable for Statistics
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<Statistics>();
		total+=self.packets_injected.capacity()*size_of::<u64>()*6;
		for row in self.data_traffic_distribution.iter().chain(self.ctrl_traffic_distribution.iter())
		{
			total+=size_of::<Vec<u64>>()+row.capacity()*size_of::<u64>();
		}
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
