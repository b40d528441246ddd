#![allow(dead_code)]

use tornoc::config::ConfigurationValue;

///A `Configuration` for a k-ary n-cube with the given routing and scripted injections.
pub fn torus_configuration(num_ary:f64, num_dim:f64, routing_algorithm:&str, cycles:f64, extra:Vec<(String,ConfigurationValue)>, injections:Vec<ConfigurationValue>) -> ConfigurationValue
{
	let mut pairs=vec![
		("random_seed".to_string(), ConfigurationValue::Number(1.0)),
		("cycles".to_string(), ConfigurationValue::Number(cycles)),
		("num_ary".to_string(), ConfigurationValue::Number(num_ary)),
		("num_dim".to_string(), ConfigurationValue::Number(num_dim)),
		("vc_per_vnet".to_string(), ConfigurationValue::Number(4.0)),
		("routing_algorithm".to_string(), ConfigurationValue::Literal(routing_algorithm.to_string())),
	];
	pairs.extend(extra);
	pairs.push(("injections".to_string(), ConfigurationValue::Array(injections)));
	ConfigurationValue::Object("Configuration".to_string(), pairs)
}

///One scripted message of `size` bits from `source` to `destination`.
pub fn injection(source:f64, destination:f64, size:f64, cycle:f64) -> ConfigurationValue
{
	ConfigurationValue::Object("Injection".to_string(), vec![
		("source".to_string(), ConfigurationValue::Number(source)),
		("destination".to_string(), ConfigurationValue::Number(destination)),
		("vnet".to_string(), ConfigurationValue::Number(0.0)),
		("size".to_string(), ConfigurationValue::Number(size)),
		("cycle".to_string(), ConfigurationValue::Number(cycle)),
	])
}

pub fn extra(name:&str, value:ConfigurationValue) -> (String,ConfigurationValue)
{
	(name.to_string(), value)
}

///Fetch a scalar field of the `Result` object.
pub fn result_number(results:&ConfigurationValue, field:&str) -> f64
{
	if let ConfigurationValue::Object(ref name, ref pairs)=results
	{
		assert_eq!( name, "Result" );
		for (key,value) in pairs
		{
			if key==field
			{
				return value.as_f64().unwrap_or_else(|_|panic!("field {} is not a number",field));
			}
		}
	}
	panic!("no field {} in the results",field);
}

///Fetch a per-vnet array field of the `Result` object.
pub fn result_array(results:&ConfigurationValue, field:&str) -> Vec<f64>
{
	if let ConfigurationValue::Object(ref name, ref pairs)=results
	{
		assert_eq!( name, "Result" );
		for (key,value) in pairs
		{
			if key==field
			{
				return value.as_array().expect("not an array").iter().map(|v|v.as_f64().expect("not a number")).collect();
			}
		}
	}
	panic!("no field {} in the results",field);
}

///After a run long enough to drain the network, every buffer must be empty and every credit returned.
pub fn assert_network_drained(simulation:&tornoc::Simulation)
{
	let params=&simulation.network.params;
	for router in simulation.network.routers.iter()
	{
		for input_unit in router.input_units.iter()
		{
			for (vc,lane) in input_unit.vcs.iter().enumerate()
			{
				assert!( lane.buffer.is_empty(), "router {} inport {} vc {} still holds flits",router.index,input_unit.id,vc );
			}
			assert!( input_unit.credit_queue.is_empty() );
		}
		for output_unit in router.output_units.iter()
		{
			for vc in 0..params.num_vcs()
			{
				assert!( output_unit.is_vc_idle(vc), "router {} outport {} vc {} still allocated",router.index,output_unit.id,vc );
				assert_eq!( output_unit.vc_states[vc].credits, params.buffers_per_vc(vc/params.vc_per_vnet), "router {} outport {} vc {} lost credits",router.index,output_unit.id,vc );
				assert!( output_unit.waiting_queues[vc].is_empty() );
			}
			assert!( output_unit.out_buffer.is_empty() );
		}
	}
}
