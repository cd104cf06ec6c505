/*!

This is the long-form manual for `adoption_model` and `adoptiondash`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values, with a header row
* `xlsx` Excel spreadsheet (first worksheet, or the one given by `--excel-worksheet-name`)

When the input type is not given, it is inferred from the extension of the file.
Files without a known extension are read as `csv`.

The first row contains the names of the columns. The following columns are required,
in any order. Other columns are ignored.

| column         | content                                          |
|----------------|--------------------------------------------------|
| `Campus`       | the name of the site, unique                     |
| `Total Users`  | integer, strictly positive                       |
| `Active Users` | integer, between 0 and `Total Users`             |
| `Adoption %`   | a number (`42.5`) or a percentage (`42.5%`)      |
| `Latitude`     | number                                           |
| `Longitude`    | number                                           |

Example:

```text
Campus,Total Users,Active Users,Adoption %,Latitude,Longitude
Fresno,12000,3000,25%,36.81,-119.75
Chico,8000,800,10%,39.73,-121.85
```

Any error in the file stops the program, with the line of the offending row.
The `Adoption %` column is only checked: all the rates displayed are computed
again from the counts. A warning is logged when it differs from the computed
rate by more than 0.1. In Excel files, percent cells hold fractions (`0.25`
for `25%`): a value of at most 1 is also compared after multiplying it by 100.

Counts are read exactly, up to the largest 64-bit integer. Counts stored as
floating point numbers in Excel are only accepted below 2^53, where they are
still exact. The sum of the `Total Users` of all the sites must also fit in a
64-bit integer.

## What-if mode

In actual mode (the default), the dashboard displays the values of the file.
In what-if mode, the number of active users of each site can be changed. The
values of the file are never changed, and a reset restores them. Switching back
to actual mode keeps the simulated values: they are displayed again when the
what-if mode is enabled again.

Values outside of `[0, Total Users]` are brought back to the nearest bound.

On the command line:

```bash
adoptiondash -i sites.csv --what-if --set Fresno=6000 --set Chico=4000
```

## Configuration

The `--config` flag reads a JSON file. The paths are relative to the location of
the configuration file.

```json
{
  "dataSource": {
    "provider": "csv",
    "filePath": "sites.csv"
  },
  "actions": [
    { "action": "toggle" },
    { "action": "set", "site": "Fresno", "activeUsers": 6000 },
    { "action": "reset" },
    { "action": "setMode", "mode": "actual" }
  ],
  "output": {
    "view": "json",
    "outputPath": "summary.json"
  }
}
```

The actions are applied in order to a new session. The actions from the command
line flags are applied after the ones of the configuration file.

## Views

* `cards` (default) prints the dashboard as text: the global gauge, the map and
  one card per site.
* `json` prints a summary of the dashboard in JSON. This is also the format of the
  `--out` and `--reference` files.

## Color buckets

| range      | color     |
|------------|-----------|
| 0 - 10     | `#FF4B4B` |
| 11 - 25    | `#FFA500` |
| 26 - 50    | `#FFD700` |
| 51 - 75    | `#90EE90` |
| 76 - 100   | `#228B22` |
| otherwise  | `#CCCCCC` |

The bounds are inclusive. A rate between two ranges (for example 10.5) gets the
fallback color `#CCCCCC`.

*/
