mod common;

use common::*;
use tornoc::Simulation;
use tornoc::config::ConfigurationValue;
use tornoc::flit::RouteInfo;
use tornoc::topology::PortDirection;

fn route_info(src_router:usize, dest_router:usize) -> RouteInfo
{
	RouteInfo{
		src_router,
		dest_router,
		dest_nodes: vec![dest_router],
		vnet: 0,
		dr: 0,
		misrouting: 0,
		hops: 0,
	}
}

///A packet for the local node never leaves its router.
#[test]
fn self_route()
{
	let cv=torus_configuration(3.0,2.0,"DETERMINISTIC",20.0,vec![],vec![
		injection(4.0,4.0,128.0,0.0),
	]);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_injected"), vec![1.0] );
	assert_eq!( result_array(&results,"packets_received"), vec![1.0] );
	assert_eq!( result_number(&results,"average_hops"), 0.0 );
	assert_eq!( result_number(&results,"average_drs"), 0.0 );
	assert_eq!( result_number(&results,"int_link_utilization"), 0.0 );
	//Interface, router and interface again: one cycle into the router, two inside, one out.
	assert_eq!( result_number(&results,"average_packet_network_latency"), 3.0 );
	assert_eq!( simulation.received_messages(4).count(), 1 );
	assert_network_drained(&simulation);
}

///One hop up dimension 0, taking the short way.
#[test]
fn single_hop_up_dimension_zero()
{
	let cv=torus_configuration(3.0,2.0,"DETERMINISTIC",20.0,vec![],vec![
		injection(0.0,1.0,128.0,0.0),
	]);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_received"), vec![1.0] );
	assert_eq!( result_number(&results,"average_hops"), 1.0 );
	assert_eq!( result_number(&results,"average_packet_network_latency"), 5.0 );
	assert_eq!( result_number(&results,"average_packet_queueing_latency"), 0.0 );
	assert_eq!( simulation.received_messages(1).count(), 1 );
	assert_network_drained(&simulation);
}

///With three routers per ring, going from 0 to 2 wraps the short way down.
#[test]
fn wrap_around_choice()
{
	let cv=torus_configuration(3.0,2.0,"DETERMINISTIC",20.0,vec![],vec![
		injection(0.0,2.0,128.0,0.0),
	]);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_received"), vec![1.0] );
	//The wrap-around way is a single hop; the forward way would take two.
	assert_eq!( result_number(&results,"average_hops"), 1.0 );
	assert_network_drained(&simulation);
	//And the chosen port is the lower one of dimension 0.
	let router=&simulation.network.routers[0];
	let (outport,class)=router.route_deterministic(&route_info(0,2),PortDirection::Local);
	assert_eq!( router.output_units[outport].direction, PortDirection::lower(0) );
	assert_eq!( class, 0 );
}

///Dimension 0 first, then dimension 1.
#[test]
fn two_dimension_route()
{
	let cv=torus_configuration(3.0,2.0,"DETERMINISTIC",30.0,vec![],vec![
		injection(0.0,4.0,128.0,0.0),
	]);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_received"), vec![1.0] );
	assert_eq!( result_number(&results,"average_hops"), 2.0 );
	assert_eq!( result_number(&results,"average_packet_network_latency"), 7.0 );
	assert_eq!( result_number(&results,"average_drs"), 0.0 );
	assert_network_drained(&simulation);
	//First hop up dimension 0; at router 1 the flit would continue up dimension 1.
	let router0=&simulation.network.routers[0];
	let (outport,_)=router0.route_deterministic(&route_info(0,4),PortDirection::Local);
	assert_eq!( router0.output_units[outport].direction, PortDirection::upper(0) );
	let router1=&simulation.network.routers[1];
	let (outport,_)=router1.route_deterministic(&route_info(0,4),PortDirection::lower(0));
	assert_eq!( router1.output_units[outport].direction, PortDirection::upper(1) );
}

///The dateline rule: class 0 below or at the wrap, class 1 otherwise.
#[test]
fn deterministic_channel_classes()
{
	let cv=torus_configuration(3.0,2.0,"DETERMINISTIC",10.0,vec![],vec![]);
	let simulation=Simulation::new(&cv);
	//From digit 0 the class is always 0.
	let (_,class)=simulation.network.routers[0].route_deterministic(&route_info(0,1),PortDirection::Local);
	assert_eq!( class, 0 );
	//From digit 1 going up to 2 the class is 1.
	let (_,class)=simulation.network.routers[1].route_deterministic(&route_info(0,2),PortDirection::lower(0));
	assert_eq!( class, 1 );
	//From digit 2 going down to 1 the class is 0 again.
	let (_,class)=simulation.network.routers[2].route_deterministic(&route_info(0,1),PortDirection::upper(0));
	assert_eq!( class, 0 );
}

///A multi-flit message streams one flit per cycle behind its head.
#[test]
fn multi_flit_packet()
{
	let cv=torus_configuration(3.0,2.0,"DETERMINISTIC",30.0,vec![],vec![
		injection(0.0,1.0,3.0*128.0,0.0),
	]);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_received"), vec![1.0] );
	assert_eq!( result_array(&results,"flits_received"), vec![3.0] );
	//The tail leaves two cycles after the head.
	assert_eq!( result_number(&results,"average_packet_network_latency"), 7.0 );
	assert_network_drained(&simulation);
}

///Every pair of a 3x3 torus under uniform scripted traffic gets delivered.
#[test]
fn all_to_all_delivery()
{
	let mut injections=vec![];
	for source in 0..9
	{
		for destination in 0..9
		{
			injections.push(injection(source as f64,destination as f64,128.0,0.0));
		}
	}
	let cv=torus_configuration(3.0,2.0,"DETERMINISTIC",200.0,vec![],injections);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_injected"), vec![81.0] );
	assert_eq!( result_array(&results,"packets_received"), vec![81.0] );
	assert_network_drained(&simulation);
	//Each destination consumed one message per source.
	for node in 0..9
	{
		assert_eq!( simulation.received_messages(node).count(), 9 );
	}
}

///The table algorithm follows the same dimension-order first hops.
#[test]
fn table_routing_delivers()
{
	let mut injections=vec![];
	for source in 0..9
	{
		injections.push(injection(source as f64,4.0,128.0,0.0));
	}
	let cv=torus_configuration(3.0,2.0,"TABLE",100.0,vec![],injections);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_received"), vec![9.0] );
	assert_network_drained(&simulation);
}

///XY routing on the reference mesh.
#[test]
fn xy_mesh_delivers()
{
	let mut pairs=vec![
		("random_seed".to_string(), ConfigurationValue::Number(1.0)),
		("cycles".to_string(), ConfigurationValue::Number(100.0)),
		("num_rows".to_string(), ConfigurationValue::Number(3.0)),
		("num_cols".to_string(), ConfigurationValue::Number(3.0)),
		("vc_per_vnet".to_string(), ConfigurationValue::Number(2.0)),
		("routing_algorithm".to_string(), ConfigurationValue::Literal("XY".to_string())),
	];
	let mut injections=vec![];
	for source in 0..9
	{
		injections.push(injection(source as f64,8.0,128.0,0.0));
	}
	pairs.push(("injections".to_string(), ConfigurationValue::Array(injections)));
	let cv=ConfigurationValue::Object("Configuration".to_string(),pairs);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_received"), vec![9.0] );
	//Corner to corner is four hops.
	let distribution=if let ConfigurationValue::Object(_,ref fields)=results
	{
		fields.iter().find(|(name,_)|name=="data_traffic_distribution").map(|(_,v)|v.clone()).expect("no distribution")
	} else { unreachable!() };
	let rows=distribution.as_array().expect("not an array");
	assert_eq!( rows[0].as_array().unwrap()[8].as_f64().unwrap(), 1.0 );
	assert_network_drained(&simulation);
}
